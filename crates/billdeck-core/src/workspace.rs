// ── Workspace facade ──
//
// One entry point for consumers: owns the API client, the in-memory data
// store and the offline cache, and exposes every CRM operation in domain
// types. Site and booking lists fall back to the cached copy when the
// backend is unreachable.

use std::sync::Arc;

use billdeck_api::transport::{TlsMode, TransportConfig};
use billdeck_api::{ApiClient, Credentials};
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{MediaKind, MediaLoader, OfflineCache, TileTemplate};
use crate::config::{ServerConfig, TlsVerification};
use crate::dashboard::{BookingSummary, Occupancy, occupancy};
use crate::deck::{Deck, DeckRequest, build_deck};
use crate::error::CoreError;
use crate::model::{
    Booking, BookingDraft, Client, ClientDraft, Company, Medium, Report, ReportDraft, Setting,
    Site, User,
};
use crate::store::DataStore;

/// Concurrent media fetches per deck or sync.
pub const MEDIA_CONCURRENCY: usize = 4;

/// Where a list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DataSource {
    Remote,
    /// Offline copy, fetched at the given time.
    Cache { fetched_at: DateTime<Utc> },
}

impl DataSource {
    /// The staler of two sources: any cached copy wins over remote data,
    /// and the earlier fetch wins between two cached copies.
    pub fn older(self, other: Self) -> Self {
        match (self, other) {
            (Self::Remote, other) => other,
            (this, Self::Remote) => this,
            (Self::Cache { fetched_at: a }, Self::Cache { fetched_at: b }) => Self::Cache {
                fetched_at: a.min(b),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingList {
    pub bookings: Vec<Booking>,
    pub source: DataSource,
}

/// Outcome of a batch of media loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MediaReport {
    pub loaded: usize,
    /// Site has no photo URL or no coordinates.
    pub unavailable: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub sites: usize,
    pub bookings: usize,
    pub media: MediaReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub bookings: BookingSummary,
    pub occupancy: Occupancy,
    pub source: DataSource,
}

/// Token returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: SecretString,
    pub user: Option<User>,
}

/// Facade over the CRM backend, cheaply cloneable.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    config: ServerConfig,
    api: Arc<ApiClient>,
    store: DataStore,
    cache: OfflineCache,
    media: MediaLoader,
}

fn transport(config: &ServerConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

impl Workspace {
    /// Build the client and open the offline cache. No network traffic.
    pub fn new(config: ServerConfig) -> Result<Self, CoreError> {
        let credentials = config.token.as_ref().map_or(Credentials::Anonymous, |token| {
            Credentials::bearer(token.expose_secret())
        });
        let api = Arc::new(ApiClient::new(
            config.url.as_str(),
            &credentials,
            &transport(&config),
        )?);
        let cache = match &config.cache_path {
            Some(path) => OfflineCache::open(path, config.media_ttl)?,
            None => OfflineCache::in_memory(config.media_ttl),
        };
        let media = MediaLoader::new(
            Arc::clone(&api),
            cache.clone(),
            TileTemplate::new(config.map_tile_url.clone())?,
            config.map_zoom,
        );

        Ok(Self {
            inner: Arc::new(WorkspaceInner {
                config,
                api,
                store: DataStore::new(),
                cache,
                media,
            }),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }

    pub fn cache(&self) -> &OfflineCache {
        &self.inner.cache
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Exchange credentials for a bearer token. Uses an anonymous client,
    /// whatever token `config` carries.
    pub async fn login(
        config: &ServerConfig,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, CoreError> {
        let api = ApiClient::new(config.url.as_str(), &Credentials::Anonymous, &transport(config))?;
        let resp = api.login(username, password).await?;
        info!(username, "logged in");
        Ok(LoginOutcome {
            token: SecretString::from(resp.token),
            user: resp.user.map(User::from),
        })
    }

    pub async fn current_user(&self) -> Result<User, CoreError> {
        Ok(self.inner.api.current_user().await?.into())
    }

    // ── Sites ────────────────────────────────────────────────────────

    /// Fetch the full inventory and replace the store's copy. When the
    /// backend cannot be reached, the cached inventory is served at any age.
    pub async fn refresh_sites(&self) -> Result<Vec<Site>, CoreError> {
        Ok(self.fetch_sites().await?.0)
    }

    async fn fetch_sites(&self) -> Result<(Vec<Site>, DataSource), CoreError> {
        let (sites, source) = match self.inner.api.list_sites().await {
            Ok(raw) => {
                let sites: Vec<Site> = raw.into_iter().map(Site::from).collect();
                if let Err(e) = self.inner.cache.store_sites(&sites, Utc::now()) {
                    warn!(error = %e, "failed to cache site list");
                }
                (sites, DataSource::Remote)
            }
            Err(e) => {
                let err = CoreError::from(e);
                if !err.is_offline() {
                    return Err(err);
                }
                let Some(cached) = self.inner.cache.cached_sites()? else {
                    return Err(err);
                };
                warn!(
                    error = %err,
                    fetched_at = %cached.fetched_at,
                    "backend unreachable, serving cached sites"
                );
                (
                    cached.value,
                    DataSource::Cache {
                        fetched_at: cached.fetched_at,
                    },
                )
            }
        };
        let stats = self.inner.store.replace_sites(sites);
        debug!(?stats, "sites refreshed");
        Ok((self.inner.store.sites(), source))
    }

    /// The inventory, fetched on first use.
    pub async fn sites(&self) -> Result<Vec<Site>, CoreError> {
        if self.inner.store.has_sites() {
            Ok(self.inner.store.sites())
        } else {
            self.refresh_sites().await
        }
    }

    pub async fn site(&self, code: &str) -> Result<Site, CoreError> {
        if let Some(site) = self.inner.store.site(code) {
            return Ok((*site).clone());
        }
        match self.inner.api.get_site(code).await {
            Ok(raw) => Ok(raw.into()),
            Err(e) if e.is_not_found() => Err(CoreError::not_found("Site", code)),
            Err(e) => Err(e.into()),
        }
    }

    // ── Bookings ─────────────────────────────────────────────────────

    /// Current bookings. When the backend cannot be reached, the cached
    /// list is served at any age.
    pub async fn bookings(&self) -> Result<BookingList, CoreError> {
        match self.inner.api.list_bookings().await {
            Ok(raw) => {
                let bookings: Vec<Booking> = raw.into_iter().map(Booking::from).collect();
                if let Err(e) = self.inner.cache.store_bookings(&bookings, Utc::now()) {
                    warn!(error = %e, "failed to cache booking list");
                }
                Ok(BookingList {
                    bookings,
                    source: DataSource::Remote,
                })
            }
            Err(e) => {
                let err = CoreError::from(e);
                if !err.is_offline() {
                    return Err(err);
                }
                let Some(cached) = self.inner.cache.cached_bookings()? else {
                    return Err(err);
                };
                warn!(
                    error = %err,
                    fetched_at = %cached.fetched_at,
                    "backend unreachable, serving cached bookings"
                );
                Ok(BookingList {
                    bookings: cached.value,
                    source: DataSource::Cache {
                        fetched_at: cached.fetched_at,
                    },
                })
            }
        }
    }

    pub async fn create_booking(&self, draft: &BookingDraft) -> Result<Booking, CoreError> {
        draft.validate()?;
        let booking: Booking = self.inner.api.create_booking(&draft.into()).await?.into();
        info!(id = %booking.id, site = %booking.site_code, "booking created");
        Ok(booking)
    }

    pub async fn update_booking(&self, id: &str, draft: &BookingDraft) -> Result<Booking, CoreError> {
        draft.validate()?;
        match self.inner.api.update_booking(id, &draft.into()).await {
            Ok(raw) => Ok(raw.into()),
            Err(e) if e.is_not_found() => Err(CoreError::not_found("Booking", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn cancel_booking(&self, id: &str, reason: Option<&str>) -> Result<(), CoreError> {
        match self.inner.api.cancel_booking(id, reason).await {
            Ok(()) => {
                info!(id, "booking cancelled");
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(CoreError::not_found("Booking", id)),
            Err(e) => Err(e.into()),
        }
    }

    // ── Clients ──────────────────────────────────────────────────────

    pub async fn clients(&self) -> Result<Vec<Client>, CoreError> {
        Ok(self
            .inner
            .api
            .list_clients()
            .await?
            .into_iter()
            .map(Client::from)
            .collect())
    }

    pub async fn client(&self, id: &str) -> Result<Client, CoreError> {
        match self.inner.api.get_client(id).await {
            Ok(raw) => Ok(raw.into()),
            Err(e) if e.is_not_found() => Err(CoreError::not_found("Client", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create_client(&self, draft: &ClientDraft) -> Result<Client, CoreError> {
        draft.validate()?;
        let client: Client = self.inner.api.create_client(&draft.into()).await?.into();
        info!(id = %client.id, name = %client.name, "client created");
        Ok(client)
    }

    pub async fn update_client(&self, id: &str, draft: &ClientDraft) -> Result<Client, CoreError> {
        draft.validate()?;
        match self.inner.api.update_client(id, &draft.into()).await {
            Ok(raw) => Ok(raw.into()),
            Err(e) if e.is_not_found() => Err(CoreError::not_found("Client", id)),
            Err(e) => Err(e.into()),
        }
    }

    // ── Reports ──────────────────────────────────────────────────────

    pub async fn reports(&self, week: Option<NaiveDate>) -> Result<Vec<Report>, CoreError> {
        let week = week.map(crate::model::week_start);
        Ok(self
            .inner
            .api
            .list_reports(week)
            .await?
            .into_iter()
            .map(Report::from)
            .collect())
    }

    pub async fn submit_report(&self, draft: &ReportDraft) -> Result<Report, CoreError> {
        draft.validate()?;
        Ok(self.inner.api.create_report(&draft.into()).await?.into())
    }

    // ── Reference data ───────────────────────────────────────────────

    pub async fn users(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.inner.api.list_users().await?.into_iter().map(User::from).collect())
    }

    pub async fn companies(&self) -> Result<Vec<Company>, CoreError> {
        Ok(self
            .inner
            .api
            .list_companies()
            .await?
            .into_iter()
            .map(Company::from)
            .collect())
    }

    pub async fn mediums(&self) -> Result<Vec<Medium>, CoreError> {
        Ok(self
            .inner
            .api
            .list_mediums()
            .await?
            .into_iter()
            .map(Medium::from)
            .collect())
    }

    pub async fn settings(&self) -> Result<Vec<Setting>, CoreError> {
        Ok(self
            .inner
            .api
            .list_settings()
            .await?
            .into_iter()
            .map(Setting::from)
            .collect())
    }

    // ── Dashboard ────────────────────────────────────────────────────

    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, CoreError> {
        let list = self.bookings().await?;
        let (sites, sites_source) = self.fetch_sites().await?;
        Ok(Dashboard {
            bookings: BookingSummary::from_bookings(&list.bookings, today),
            occupancy: occupancy(&sites, &list.bookings, today),
            source: list.source.older(sites_source),
        })
    }

    // ── Decks ────────────────────────────────────────────────────────

    /// Price a deck and, when requested, attach media.
    pub async fn deck(
        &self,
        request: &DeckRequest,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<(Deck, MediaReport), CoreError> {
        let sites = self.sites().await?;
        let mut deck = build_deck(request, &sites, &self.inner.config.currency, today)?;
        let report = if request.include_media {
            self.attach_media(&mut deck, cancel).await?
        } else {
            MediaReport::default()
        };
        Ok((deck, report))
    }

    /// Fill every slide's photo and map through the offline cache.
    ///
    /// Individual failures are counted and logged; cancellation aborts the
    /// whole batch.
    pub async fn attach_media(
        &self,
        deck: &mut Deck,
        cancel: &CancellationToken,
    ) -> Result<MediaReport, CoreError> {
        let jobs: Vec<(usize, MediaKind, Site)> = deck
            .slides
            .iter()
            .enumerate()
            .flat_map(|(i, slide)| MediaKind::ALL.map(|kind| (i, kind, slide.site.clone())))
            .collect();

        let mut report = MediaReport::default();
        for (i, kind, result) in self.load_media(jobs, cancel).await {
            match result {
                Ok(Some(url)) => {
                    report.loaded += 1;
                    if let Some(slide) = deck.slides.get_mut(i) {
                        match kind {
                            MediaKind::Image => slide.image = Some(url),
                            MediaKind::Map => slide.map = Some(url),
                        }
                    }
                }
                Ok(None) => report.unavailable += 1,
                Err(CoreError::Cancelled) => return Err(CoreError::Cancelled),
                Err(_) => report.failed += 1,
            }
        }
        Ok(report)
    }

    async fn load_media<K: Send>(
        &self,
        jobs: Vec<(K, MediaKind, Site)>,
        cancel: &CancellationToken,
    ) -> Vec<(K, MediaKind, Result<Option<String>, CoreError>)> {
        let media = &self.inner.media;
        stream::iter(jobs)
            .map(|(tag, kind, site)| async move {
                let result = media.load(kind, &site, cancel).await;
                (tag, kind, result)
            })
            .buffer_unordered(MEDIA_CONCURRENCY)
            .collect()
            .await
    }

    // ── Offline cache ────────────────────────────────────────────────

    /// Refresh sites and bookings, and warm the media cache for every site.
    pub async fn sync_cache(&self, cancel: &CancellationToken) -> Result<SyncReport, CoreError> {
        let (sites, sites_source) = self.fetch_sites().await?;
        let list = self.bookings().await?;
        if list.source.older(sites_source) != DataSource::Remote {
            return Err(CoreError::ConnectionFailed {
                url: self.inner.config.url.to_string(),
                reason: "backend unreachable during sync".into(),
            });
        }

        let jobs: Vec<((), MediaKind, Site)> = sites
            .iter()
            .flat_map(|site| MediaKind::ALL.map(|kind| ((), kind, site.clone())))
            .collect();

        let mut media = MediaReport::default();
        for ((), _, result) in self.load_media(jobs, cancel).await {
            match result {
                Ok(Some(_)) => media.loaded += 1,
                Ok(None) => media.unavailable += 1,
                Err(CoreError::Cancelled) => return Err(CoreError::Cancelled),
                Err(_) => media.failed += 1,
            }
        }

        let report = SyncReport {
            sites: sites.len(),
            bookings: list.bookings.len(),
            media,
        };
        info!(
            sites = report.sites,
            bookings = report.bookings,
            loaded = media.loaded,
            failed = media.failed,
            "offline cache synced"
        );
        Ok(report)
    }
}
