// ── Media loading through the offline cache ──

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use billdeck_api::ApiClient;

use super::{MediaKind, OfflineCache};
use crate::error::CoreError;
use crate::model::Site;

/// Static map snapshot service used when no template is configured.
pub const DEFAULT_TILE_TEMPLATE: &str = "https://staticmap.openstreetmap.de/staticmap.php?center={lat},{lng}&zoom={zoom}&size=640x360&markers={lat},{lng},red-pushpin";

/// URL template for map snapshots with `{lat}`, `{lng}` and `{zoom}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTemplate(String);

impl TileTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, CoreError> {
        let template = template.into();
        if !(template.contains("{lat}") && template.contains("{lng}")) {
            return Err(CoreError::Config {
                message: format!("map tile template '{template}' needs {{lat}} and {{lng}}"),
            });
        }
        Ok(Self(template))
    }

    pub fn render(&self, lat: f64, lng: f64, zoom: u8) -> String {
        self.0
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string())
            .replace("{zoom}", &zoom.to_string())
    }
}

impl Default for TileTemplate {
    fn default() -> Self {
        Self(DEFAULT_TILE_TEMPLATE.to_owned())
    }
}

/// Encode bytes as a `data:` URL.
///
/// Falls back to a guess from the source URL's extension when the server
/// sent no content type.
pub fn encode_data_url(bytes: &[u8], content_type: Option<&str>, source: &str) -> String {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| guess_mime(source));
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn guess_mime(source: &str) -> &'static str {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Loads site photos and map snapshots, serving fresh copies from the
/// offline cache and fetching the rest.
#[derive(Clone)]
pub struct MediaLoader {
    api: Arc<ApiClient>,
    cache: OfflineCache,
    tiles: TileTemplate,
    zoom: u8,
}

impl MediaLoader {
    pub fn new(api: Arc<ApiClient>, cache: OfflineCache, tiles: TileTemplate, zoom: u8) -> Self {
        Self {
            api,
            cache,
            tiles,
            zoom,
        }
    }

    /// Where `kind` comes from for `site`, if anywhere.
    pub fn source_url(&self, kind: MediaKind, site: &Site) -> Option<String> {
        match kind {
            MediaKind::Image => site.image_url.clone().filter(|u| !u.trim().is_empty()),
            MediaKind::Map => site
                .coordinates()
                .map(|(lat, lng)| self.tiles.render(lat, lng, self.zoom)),
        }
    }

    /// Return the media as a data URL. `Ok(None)` when the site has no
    /// photo or no coordinates.
    ///
    /// A cancelled load returns [`CoreError::Cancelled`] and leaves the
    /// cache untouched.
    pub async fn load(
        &self,
        kind: MediaKind,
        site: &Site,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, CoreError> {
        let Some(url) = self.source_url(kind, site) else {
            return Ok(None);
        };
        let key = kind.key(&site.code);

        if let Some(hit) = self.cache.fresh_media(&key, Utc::now())? {
            debug!(%key, "media cache hit");
            return Ok(Some(hit));
        }

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(%key, "media load cancelled");
                return Err(CoreError::Cancelled);
            }
            res = self.api.fetch_media(&url) => res,
        };

        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                warn!(site = %site.code, %kind, error = %e, "failed to fetch media");
                return Err(e.into());
            }
        };

        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let data_url = encode_data_url(&payload.bytes, payload.content_type.as_deref(), &url);
        self.cache.store_media(&key, &data_url, Utc::now())?;
        debug!(%key, bytes = payload.bytes.len(), "media cached");
        Ok(Some(data_url))
    }
}
