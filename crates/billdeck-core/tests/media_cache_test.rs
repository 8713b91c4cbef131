#![allow(clippy::unwrap_used)]
// Offline cache behaviour against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use billdeck_api::{ApiClient, Credentials, TransportConfig};
use billdeck_core::cache::{MediaLoader, TileTemplate};
use billdeck_core::{
    CoreError, DataSource, MediaKind, OfflineCache, ServerConfig, Site, Workspace,
};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G'];

// ── Helpers ─────────────────────────────────────────────────────────

fn site(server: &MockServer) -> Site {
    Site {
        code: "EDSA-001".into(),
        name: Some("Guadalupe Northbound".into()),
        area: Some("Makati".into()),
        landmarks: vec!["Guadalupe Bridge".into()],
        latitude: Some(14.5672),
        longitude: Some(121.0454),
        price: 250_000.0,
        facing: None,
        size: None,
        owner: None,
        available_from: None,
        image_url: Some(format!("{}/photos/edsa-001.png", server.uri())),
    }
}

fn loader(server: &MockServer, cache: &OfflineCache) -> MediaLoader {
    let api = ApiClient::new(
        &format!("{}/api", server.uri()),
        &Credentials::bearer("test-token"),
        &TransportConfig::default(),
    )
    .unwrap();
    let tiles = TileTemplate::new(format!("{}/tiles/{{zoom}}/{{lat}}/{{lng}}.png", server.uri())).unwrap();
    MediaLoader::new(Arc::new(api), cache.clone(), tiles, 15)
}

async fn mount_photo(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/photos/edsa-001.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(PNG.to_vec()),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn open_cache(dir: &tempfile::TempDir) -> OfflineCache {
    OfflineCache::open(&dir.path().join("cache.redb"), TimeDelta::hours(24)).unwrap()
}

// ── Media ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_media_is_fetched_once_then_served_from_cache() {
    let server = MockServer::start().await;
    mount_photo(&server, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir);
    let loader = loader(&server, &cache);
    let site = site(&server);
    let cancel = CancellationToken::new();

    let first = loader.load(MediaKind::Image, &site, &cancel).await.unwrap().unwrap();
    let second = loader.load(MediaKind::Image, &site, &cancel).await.unwrap().unwrap();

    assert_eq!(first, "data:image/png;base64,iVBORw==");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_stale_media_is_refetched() {
    let server = MockServer::start().await;
    mount_photo(&server, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir);
    let key = MediaKind::Image.key("EDSA-001");
    cache
        .store_media(&key, "data:image/png;base64,OLD=", Utc::now() - TimeDelta::hours(24))
        .unwrap();

    let loaded = loader(&server, &cache)
        .load(MediaKind::Image, &site(&server), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(loaded.as_deref(), Some("data:image/png;base64,iVBORw=="));
    assert_eq!(
        cache.fresh_media(&key, Utc::now()).unwrap().as_deref(),
        Some("data:image/png;base64,iVBORw==")
    );
}

#[tokio::test]
async fn test_map_snapshot_uses_tile_template() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiles/15/14.5672/121.0454.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(PNG.to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir);

    let map = loader(&server, &cache)
        .load(MediaKind::Map, &site(&server), &CancellationToken::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(map, "data:image/png;base64,iVBORw==");
}

#[tokio::test]
async fn test_site_without_coordinates_has_no_map() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir);
    let mut site = site(&server);
    site.latitude = None;

    let map = loader(&server, &cache)
        .load(MediaKind::Map, &site, &CancellationToken::new())
        .await
        .unwrap();

    assert!(map.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_load_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos/edsa-001.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG.to_vec())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir);
    let loader = loader(&server, &cache);
    let site = site(&server);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = loader.load(MediaKind::Image, &site, &cancel).await;

    assert!(matches!(result, Err(CoreError::Cancelled)), "got {result:?}");
    assert_eq!(cache.stats(Utc::now()).unwrap().images, 0);
}

#[tokio::test]
async fn test_failed_fetch_is_an_error_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photos/edsa-001.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir);

    let result = loader(&server, &cache)
        .load(MediaKind::Image, &site(&server), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(CoreError::NotFound { .. })), "got {result:?}");
    assert_eq!(cache.stats(Utc::now()).unwrap().images, 0);
}

// ── Bookings fallback ───────────────────────────────────────────────

fn booking_json() -> serde_json::Value {
    json!({
        "data": [{
            "id": 1,
            "site_code": "EDSA-001",
            "client": "Globe",
            "account_executives": ["jdoe"],
            "start_date": "2026-10-01",
            "end_date": "2027-03-31",
            "monthly_rate": 200000,
            "status": "ONGOING"
        }]
    })
}

fn workspace(server: &MockServer, dir: &tempfile::TempDir) -> Workspace {
    let mut config = ServerConfig::new(format!("{}/api", server.uri()).parse().unwrap());
    config.token = Some("test-token".to_string().into());
    config.cache_path = Some(dir.path().join("cache.redb"));
    Workspace::new(config).unwrap()
}

#[tokio::test]
async fn test_bookings_fall_back_to_cache_when_backend_is_down() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let ws = workspace(&server, &dir);
    let online = ws.bookings().await.unwrap();
    assert_eq!(online.source, DataSource::Remote);
    assert_eq!(online.bookings.len(), 1);

    let offline = ws.bookings().await.unwrap();
    assert!(matches!(offline.source, DataSource::Cache { .. }));
    assert_eq!(offline.bookings, online.bookings);
}

#[tokio::test]
async fn test_bookings_error_without_cached_copy() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = workspace(&server, &dir).bookings().await;
    assert!(matches!(result, Err(CoreError::ConnectionFailed { .. })), "got {result:?}");
}

#[tokio::test]
async fn test_non_transport_errors_do_not_fall_back() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bookings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let ws = workspace(&server, &dir);
    ws.bookings().await.unwrap();
    let result = ws.bookings().await;
    assert!(matches!(result, Err(CoreError::SessionExpired)), "got {result:?}");
}

#[tokio::test]
async fn test_dashboard_from_fresh_workspace_uses_cached_lists() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    for (route, body) in [
        ("/api/bookings", booking_json()),
        ("/api/sites", json!({ "data": [{ "site_code": "EDSA-001", "price": 250000 }] })),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
    }
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();

    let online = workspace(&server, &dir).dashboard(today).await.unwrap();
    assert_eq!(online.source, DataSource::Remote);

    // A new workspace starts with an empty store, so sites must come from disk
    let offline = workspace(&server, &dir).dashboard(today).await.unwrap();
    assert!(matches!(offline.source, DataSource::Cache { .. }), "got {:?}", offline.source);
    assert_eq!(offline.occupancy.total, 1);
    assert_eq!(offline.occupancy.occupied, 1);
    assert_eq!(offline.bookings.total, 1);
}

// ── Decks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_deck_attaches_media_for_each_slide() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "site_code": "EDSA-001", "price": 100000, "lat": 14.5, "lng": 121.0,
                  "image_url": format!("{}/photos/edsa-001.png", server.uri()) },
                { "site_code": "SLEX-010", "price": 50000 }
            ]
        })))
        .mount(&server)
        .await;
    mount_photo(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/staticmap.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG.to_vec()))
        .mount(&server)
        .await;

    let mut config = ServerConfig::new(format!("{}/api", server.uri()).parse().unwrap());
    config.token = Some("test-token".to_string().into());
    config.cache_path = Some(dir.path().join("cache.redb"));
    config.map_tile_url = format!("{}/staticmap.png?c={{lat}},{{lng}}", server.uri());
    let ws = Workspace::new(config).unwrap();

    let request = billdeck_core::DeckRequest {
        title: "Q1".into(),
        client: None,
        selection: billdeck_core::SiteSelection::Codes(vec!["EDSA-001".into(), "SLEX-010".into()]),
        adjustments: vec!["-10%".parse().unwrap()],
        currency: None,
        durations: Vec::new(),
        include_media: true,
    };
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
    let (deck, report) = ws.deck(&request, today, &CancellationToken::new()).await.unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(report.unavailable, 2);
    assert_eq!(report.failed, 0);
    assert!(deck.slides[0].image.is_some());
    assert!(deck.slides[0].map.is_some());
    assert!(deck.slides[1].image.is_none());
    assert!((deck.slides[0].adjusted_price - 90_000.0).abs() < 1e-9);
}
