// CRM REST HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token injection,
// envelope unwrapping and error mapping. Endpoint groups (sites, bookings,
// etc.) are implemented as inherent methods in `endpoints/` to keep this
// module focused on transport mechanics.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

const PREVIEW_LEN: usize = 200;

/// Error body shape used by the backend: `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Most list endpoints answer `{"data": [...]}`, a few answer the bare value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Raw bytes of a fetched image plus the server-declared content type.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Async client for the CRM REST backend.
///
/// All methods return unwrapped payloads -- the `{ data }` envelope is
/// stripped before the caller sees it.
pub struct ApiClient {
    http: reqwest::Client,
    /// Separate client without the `Authorization` header, used for
    /// third-party image and map tile hosts.
    media_http: reqwest::Client,
    base_url: Url,
    authenticated: bool,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` (e.g. `https://crm.example.com/api`).
    ///
    /// Bearer credentials are injected as a default header on every
    /// request to the backend.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(credentials.default_headers()?)?;
        let media_http = transport.build_client()?;
        Ok(Self {
            http,
            media_http,
            base_url: Self::normalize_base_url(base_url)?,
            authenticated: !credentials.is_anonymous(),
        })
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// Fetch an absolute media URL (site photo or map tile) as raw bytes.
    ///
    /// Goes through the header-less client so the bearer token never
    /// leaves the backend's origin.
    pub async fn fetch_media(&self, url: &str) -> Result<MediaPayload, Error> {
        let url = Url::parse(url)?;
        debug!("GET {url} (media)");

        let resp = self.media_http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = resp.bytes().await?.to_vec();
        trace!(len = bytes.len(), ?content_type, "media fetched");

        Ok(MediaPayload {
            bytes,
            content_type,
        })
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope.into_inner()),
            Err(_) => {
                // Untagged errors are opaque; re-parse the bare shape to
                // surface the real field-level message.
                let message = serde_json::from_str::<T>(&body)
                    .err()
                    .map_or_else(|| "unexpected envelope".to_owned(), |e| e.to_string());
                let preview: String = body.chars().take(PREVIEW_LEN).collect();
                Err(Error::Deserialization {
                    message: format!("{message} (body preview: {preview:?})"),
                    body,
                })
            }
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return if self.authenticated {
                Error::SessionExpired
            } else {
                Error::MissingToken
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(PREVIEW_LEN).collect()
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}
