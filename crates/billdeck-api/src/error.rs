use thiserror::Error;

/// Top-level error type for the `billdeck-api` crate.
///
/// Covers every failure mode of the CRM REST surface: authentication,
/// transport, structured API errors and payload decoding.
/// `billdeck-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, disabled account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The bearer token was rejected on an authenticated call.
    #[error("Session expired -- log in again")]
    SessionExpired,

    /// Endpoint requires a token but the client was built without one.
    #[error("No bearer token configured")]
    MissingToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status, with the server's message when it sent one.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_404_is_not_found() {
        let err = Error::Api {
            status: 404,
            message: "no such site".into(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn other_statuses_are_not_not_found() {
        let err = Error::Api {
            status: 503,
            message: "maintenance".into(),
        };
        assert!(!err.is_not_found());
        assert!(!Error::SessionExpired.is_not_found());
    }
}
