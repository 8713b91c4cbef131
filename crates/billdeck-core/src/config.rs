// ── Runtime connection configuration ──
//
// Describes *how* to reach the CRM backend and where the offline cache
// lives. Never touches disk; the config crate builds one from a profile
// and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use secrecy::SecretString;
use url::Url;

use crate::cache::{DEFAULT_MEDIA_TTL, DEFAULT_TILE_TEMPLATE};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed staging servers).
    DangerAcceptInvalid,
}

pub const DEFAULT_MAP_ZOOM: u8 = 16;

/// Everything needed to open a [`Workspace`](crate::Workspace).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Backend API base URL (e.g., `https://crm.example.com/api`).
    pub url: Url,
    /// Bearer token. `None` until `billdeck login` has run.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Offline cache database. `None` disables caching.
    pub cache_path: Option<PathBuf>,
    pub map_tile_url: String,
    pub map_zoom: u8,
    pub media_ttl: TimeDelta,
    /// Base currency code prices are quoted in.
    pub currency: String,
}

impl ServerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            cache_path: None,
            map_tile_url: DEFAULT_TILE_TEMPLATE.to_owned(),
            map_zoom: DEFAULT_MAP_ZOOM,
            media_ttl: DEFAULT_MEDIA_TTL,
            currency: "PHP".into(),
        }
    }
}
