//! CLI configuration, a thin wrapper around `billdeck_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--server, --token, --timeout, ...).

use std::time::Duration;

use secrecy::SecretString;

use billdeck_core::{ServerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use billdeck_config::{
    Config, Profile, config_path, forget_token, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-joined profile names for "profile not found" help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Build a `ServerConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--server` alone is enough.
pub fn build_server_config(global: &GlobalOpts) -> Result<(ServerConfig, String), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None => {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            let server = global.server.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(server)
        }
    };

    let mut profile = profile;
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }

    let mut server = billdeck_config::profile_to_server_config(&profile, &profile_name, &cfg.defaults)?;
    apply_overrides(&mut server, global);
    Ok((server, profile_name))
}

/// CLI flag overrides take priority over profile values.
fn apply_overrides(server: &mut ServerConfig, global: &GlobalOpts) {
    if let Some(ref token) = global.token {
        server.token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        server.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        server.timeout = Duration::from_secs(secs);
    }
    if let Some(ref path) = global.cache_path {
        server.cache_path = Some(path.clone());
    }
}
