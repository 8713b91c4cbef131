// billdeck-api: Async Rust client for the billdeck CRM REST backend

pub mod auth;
pub mod client;
mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::{ApiClient, MediaPayload};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
