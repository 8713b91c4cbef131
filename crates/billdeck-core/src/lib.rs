//! Domain layer between `billdeck-api` and the CLI.
//!
//! - **[`Workspace`]**: facade over the CRM backend. Owns the API client,
//!   the [`DataStore`] and the [`OfflineCache`]; every operation returns
//!   canonical domain types.
//!
//! - **Pricing** ([`pricing`]): ordered, scoped price adjustments, manual
//!   currency conversion and per-duration rate tables.
//!
//! - **Filters** ([`filter`]): [`FilterState`] composes area, landmark,
//!   price, availability, owner and text predicates into one conjunction.
//!
//! - **Decks** ([`deck`]): priced sales proposals built from explicit site
//!   codes or a filter, with photos and map snapshots attached through the
//!   offline cache.
//!
//! - **Offline cache** ([`cache`]): redb-backed store of media data URLs
//!   (24-hour freshness) and the last site and booking lists (served when
//!   offline). Loads race a `CancellationToken` and store nothing when cancelled.
//!
//! - **Dashboard** ([`dashboard`]): booking counts, revenue, expiring
//!   contracts, occupancy and weekly report tallies.

pub mod cache;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod deck;
pub mod error;
pub mod filter;
pub mod model;
pub mod pricing;
pub mod store;
pub mod workspace;

pub use cache::{CacheStats, CachedEntry, MediaKind, OfflineCache};
pub use config::{ServerConfig, TlsVerification};
pub use dashboard::{BookingSummary, Occupancy, ReportSummary};
pub use deck::{Deck, DeckRequest, DeckSlide, SiteSelection};
pub use error::CoreError;
pub use filter::{DateWindow, FilterOptions, FilterState};
pub use pricing::{
    AdjustmentKind, AdjustmentScope, CurrencyConversion, Money, Operation, PriceAdjustment,
    PriceRange, RateDuration, RateRow,
};
pub use store::DataStore;
pub use workspace::{
    BookingList, Dashboard, DataSource, LoginOutcome, MediaReport, SyncReport, Workspace,
};

pub use model::{
    Booking, BookingDraft, BookingStatus, Client, ClientDraft, Company, Medium, Report,
    ReportDraft, Setting, Site, User,
};
