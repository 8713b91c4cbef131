//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use billdeck_config::ConfigError;
use billdeck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the CRM at {url}")]
    #[diagnostic(
        code(billdeck::connection_failed),
        help(
            "Check the server URL and your network connection.\n\
             Bookings and cached media stay available offline: billdeck bookings list"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(billdeck::auth_failed),
        help("Check your username and password, then run: billdeck login")
    )]
    AuthFailed { message: String },

    #[error("Session expired or token rejected")]
    #[diagnostic(
        code(billdeck::session_expired),
        help("Log in again with: billdeck login --profile {profile}")
    )]
    SessionExpired { profile: String },

    #[error("Not logged in on profile '{profile}'")]
    #[diagnostic(
        code(billdeck::no_token),
        help(
            "Run: billdeck login --profile {profile}\n\
             Or set the BILLDECK_TOKEN environment variable."
        )
    )]
    NoToken { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(billdeck::not_found),
        help("Run: billdeck {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("CRM error: {message}")]
    #[diagnostic(code(billdeck::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(billdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(billdeck::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: billdeck config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(billdeck::no_config),
        help(
            "Create a profile with: billdeck config init\n\
             Or pass --server. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(billdeck::config))]
    Config(ConfigError),

    // ── Local cache ──────────────────────────────────────────────────

    #[error("Offline cache error: {message}")]
    #[diagnostic(
        code(billdeck::cache),
        help("Reset the cache with: billdeck cache clear")
    )]
    Cache { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(billdeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Interrupted")]
    #[diagnostic(code(billdeck::interrupted))]
    Interrupted,

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(billdeck::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    #[error("Internal error: {0}")]
    #[diagnostic(code(billdeck::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(billdeck::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::SessionExpired { .. } | Self::NoToken { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            Self::ApiError {
                status: Some(403), ..
            } => exit_code::PERMISSION,
            Self::ApiError {
                status: Some(409), ..
            } => exit_code::CONFLICT,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Tag a session-expired error with the profile to log in on.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::SessionExpired { .. } => Self::SessionExpired {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_command(entity_type: &str) -> String {
    match entity_type.to_ascii_lowercase().as_str() {
        "site" => "sites list".into(),
        "booking" => "bookings list".into(),
        "client" => "clients list".into(),
        "report" => "reports list".into(),
        "media" => "cache status".into(),
        other => format!("{other}s list"),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired => CliError::SessionExpired {
                profile: "default".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Cache { message } => CliError::Cache { message },

            CoreError::Cancelled => CliError::Interrupted,

            CoreError::Config { message } => CliError::Config(ConfigError::Validation {
                field: "config".into(),
                reason: message,
            }),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
