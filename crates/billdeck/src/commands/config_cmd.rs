//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use billdeck_core::cache::TileTemplate;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Replace plaintext profile tokens with a mask before anything is printed.
fn redact_tokens(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
}

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref path) = p.cache_path {
            let _ = writeln!(out, "cache_path = \"{}\"", path.display());
        }
        if let Some(ref tiles) = p.map_tile_url {
            let _ = writeln!(out, "map_tile_url = \"{tiles}\"");
        }
        if let Some(zoom) = p.map_zoom {
            let _ = writeln!(out, "map_zoom = {zoom}");
        }
        if let Some(hours) = p.media_ttl_hours {
            let _ = writeln!(out, "media_ttl_hours = {hours}");
        }
        if let Some(ref currency) = p.currency {
            let _ = writeln!(out, "currency = \"{currency}\"");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::validation(field, format!("must be {expected}")))
}

const KEYS: &str = "server, username, token_env, ca_cert, insecure, timeout, cache_path, \
                    map_tile_url, map_zoom, media_ttl_hours, currency";

/// Apply `key = value` to a profile. Accepts `-` in place of `_` in key names.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "server" => {
            url::Url::parse(&value)
                .map_err(|e| CliError::validation("server", format!("invalid URL: {e}")))?;
            profile.server = value;
        }
        "username" => profile.username = Some(value),
        "token_env" => profile.token_env = Some(value),
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_field("insecure", &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_field("timeout", &value, "a number (seconds)")?),
        "cache_path" => profile.cache_path = Some(value.into()),
        "map_tile_url" => {
            TileTemplate::new(value.clone())
                .map_err(|e| CliError::validation("map_tile_url", e.to_string()))?;
            profile.map_tile_url = Some(value);
        }
        "map_zoom" => {
            let zoom: u8 = parse_field("map_zoom", &value, "a zoom level between 0 and 19")?;
            if zoom > 19 {
                return Err(CliError::validation("map_zoom", "must be a zoom level between 0 and 19"));
            }
            profile.map_zoom = Some(zoom);
        }
        "media_ttl_hours" => {
            let hours: u32 = parse_field("media_ttl_hours", &value, "a positive number of hours")?;
            if hours == 0 {
                return Err(CliError::validation("media_ttl_hours", "must be a positive number of hours"));
            }
            profile.media_ttl_hours = Some(hours);
        }
        "currency" => {
            let code = value.trim().to_uppercase();
            if code.is_empty() {
                return Err(CliError::validation("currency", "cannot be empty"));
            }
            profile.currency = Some(code);
        }
        other => {
            return Err(CliError::validation(
                other,
                format!("unknown config key '{other}'. Valid keys: {KEYS}"),
            ));
        }
    }
    Ok(())
}

fn profile_not_found(cfg: &Config, name: &str) -> CliError {
    CliError::ProfileNotFound {
        name: name.into(),
        available: config::available_profiles(cfg),
    }
}

/// Read a token from the terminal and store it in the keyring.
fn prompt_and_store_token(profile_name: &str) -> Result<(), CliError> {
    let token = rpassword::prompt_password("Token: ").map_err(prompt_err)?;
    if token.trim().is_empty() {
        return Err(CliError::validation("token", "value cannot be empty"));
    }
    config::store_token(profile_name, &SecretString::from(token.trim().to_owned()))?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("Billdeck configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("CRM API URL")
                .default("https://crm.example.com/api".into())
                .validate_with(|s: &String| url::Url::parse(s).map(|_| ()).map_err(|e| e.to_string()))
                .interact_text()
                .map_err(prompt_err)?;

            let username: String = Input::new()
                .with_prompt("Username (blank to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let currency: String = Input::new()
                .with_prompt("Base currency")
                .default("PHP".into())
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(server);
            if !username.trim().is_empty() {
                profile.username = Some(username.trim().to_owned());
            }
            set_key(&mut profile, "currency", currency)?;

            let choices = &[
                "Log in later with `billdeck login` (recommended)",
                "Paste an existing token into the system keyring",
            ];
            let selection = Select::new()
                .with_prompt("Session token")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            if selection == 1 {
                prompt_and_store_token(&profile_name)?;
                eprintln!("   ✓ Token stored in system keyring");
            }

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);
            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                profiles,
                ..Config::default()
            };
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            if selection == 0 {
                eprintln!("\n  Next: billdeck login");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            redact_tokens(&mut cfg);
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            output::notice(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: billdeck config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, &name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, &profile_name));
            }
            prompt_and_store_token(&profile_name)?;
            output::notice(
                &format!("✓ Token stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_key_accepts_dashed_names() {
        let mut p = Profile::new("https://crm.example.com/api");
        set_key(&mut p, "media-ttl-hours", "12".into()).unwrap();
        set_key(&mut p, "currency", " usd ".into()).unwrap();
        assert_eq!(p.media_ttl_hours, Some(12));
        assert_eq!(p.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn set_key_rejects_bad_values() {
        let mut p = Profile::default();
        assert!(set_key(&mut p, "map_zoom", "20".into()).is_err());
        assert!(set_key(&mut p, "media_ttl_hours", "0".into()).is_err());
        assert!(set_key(&mut p, "timeout", "soon".into()).is_err());
        assert!(set_key(&mut p, "server", "not a url".into()).is_err());
        assert!(set_key(&mut p, "map_tile_url", "https://tiles.example.com/{zoom}.png".into()).is_err());
        assert_eq!(p, Profile::default());
    }

    #[test]
    fn unknown_keys_list_the_valid_ones() {
        let mut p = Profile::default();
        match set_key(&mut p, "site", "x".into()) {
            Err(CliError::Validation { reason, .. }) => assert!(reason.contains("media_ttl_hours")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn redacted_view_masks_plaintext_tokens() {
        let mut profile = Profile::new("https://crm.example.com/api");
        profile.token = Some("secret-token".into());
        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile);

        let text = format_config_redacted(&cfg);
        assert!(text.contains("token = \"****\""));
        assert!(!text.contains("secret-token"));
    }
}
