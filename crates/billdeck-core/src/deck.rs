// ── Deck builder ──
//
// Resolves the sites for a sales proposal, prices each one through the
// adjustment engine, converts into the client's currency and expands the
// rate table. Media is attached separately by `Workspace::attach_media`
// since it needs the network.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::filter::FilterState;
use crate::model::Site;
use crate::pricing::{CurrencyConversion, PriceAdjustment, RateDuration, RateRow, price_for, rate_table};

/// Which sites go into the deck.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteSelection {
    /// Explicit codes, kept in the given order.
    Codes(Vec<String>),
    /// Everything the filter lets through.
    Filter(FilterState),
}

#[derive(Debug, Clone)]
pub struct DeckRequest {
    pub title: String,
    pub client: Option<String>,
    pub selection: SiteSelection,
    pub adjustments: Vec<PriceAdjustment>,
    pub currency: Option<CurrencyConversion>,
    pub durations: Vec<RateDuration>,
    pub include_media: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSlide {
    pub site: Site,
    pub base_price: f64,
    /// After adjustments, still in the base currency.
    pub adjusted_price: f64,
    /// After currency conversion.
    pub display_price: f64,
    pub currency: String,
    pub rates: Vec<RateRow>,
    pub image: Option<String>,
    pub map: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeckTotals {
    pub sites: usize,
    pub base: f64,
    pub adjusted: f64,
    pub display: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deck {
    pub title: String,
    pub client: Option<String>,
    pub generated_on: NaiveDate,
    pub currency: String,
    pub exchange_rate: Option<f64>,
    pub slides: Vec<DeckSlide>,
    pub totals: DeckTotals,
}

/// Build a priced deck from `sites`. Prices are quoted in `base_currency`
/// unless the request carries a conversion.
pub fn build_deck(
    request: &DeckRequest,
    sites: &[Site],
    base_currency: &str,
    today: NaiveDate,
) -> Result<Deck, CoreError> {
    if request.title.trim().is_empty() {
        return Err(CoreError::validation("deck title is required"));
    }

    let selected = resolve_sites(&request.selection, sites, today)?;
    if selected.is_empty() {
        return Err(CoreError::validation("no sites match the deck selection"));
    }

    let currency = request
        .currency
        .as_ref()
        .map_or_else(|| base_currency.to_owned(), |c| c.code().to_owned());

    let mut totals = DeckTotals::default();
    let slides: Vec<DeckSlide> = selected
        .into_iter()
        .map(|site| {
            let adjusted_price = price_for(site, &request.adjustments);
            let display_price = request
                .currency
                .as_ref()
                .map_or(adjusted_price, |c| c.convert(adjusted_price));

            totals.sites += 1;
            totals.base += site.price;
            totals.adjusted += adjusted_price;
            totals.display += display_price;

            DeckSlide {
                base_price: site.price,
                adjusted_price,
                display_price,
                currency: currency.clone(),
                rates: quoted_rates(adjusted_price, request),
                image: None,
                map: None,
                site: site.clone(),
            }
        })
        .collect();

    Ok(Deck {
        title: request.title.trim().to_owned(),
        client: request.client.clone(),
        generated_on: today,
        exchange_rate: request.currency.as_ref().map(CurrencyConversion::exchange_rate),
        currency,
        slides,
        totals,
    })
}

/// Rate rows in the quote currency. Discounts apply to the base-currency
/// price, like the adjustments, and each row is then converted.
fn quoted_rates(adjusted_price: f64, request: &DeckRequest) -> Vec<RateRow> {
    let rows = rate_table(adjusted_price, &request.durations);
    match request.currency {
        Some(ref conversion) => rows
            .into_iter()
            .map(|row| RateRow {
                months: row.months,
                monthly_rate: conversion.convert(row.monthly_rate),
                total: conversion.convert(row.total),
            })
            .collect(),
        None => rows,
    }
}

fn resolve_sites<'s>(
    selection: &SiteSelection,
    sites: &'s [Site],
    today: NaiveDate,
) -> Result<Vec<&'s Site>, CoreError> {
    match selection {
        SiteSelection::Filter(filter) => Ok(filter.apply(sites, today)),
        SiteSelection::Codes(codes) => {
            let by_code: HashMap<String, &Site> =
                sites.iter().map(|s| (s.code.to_uppercase(), s)).collect();
            let mut seen = HashSet::new();
            let mut out = Vec::with_capacity(codes.len());
            let mut missing = Vec::new();

            for code in codes {
                let key = code.trim().to_uppercase();
                if !seen.insert(key.clone()) {
                    continue;
                }
                match by_code.get(&key) {
                    Some(site) => out.push(*site),
                    None => missing.push(code.trim().to_owned()),
                }
            }

            if missing.is_empty() {
                Ok(out)
            } else {
                Err(CoreError::not_found("Site", missing.join(", ")))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn site(code: &str, area: &str, price: f64) -> Site {
        Site {
            code: code.into(),
            name: None,
            area: Some(area.into()),
            landmarks: Vec::new(),
            latitude: None,
            longitude: None,
            price,
            facing: None,
            size: None,
            owner: None,
            available_from: None,
            image_url: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn request(selection: SiteSelection) -> DeckRequest {
        DeckRequest {
            title: "Q1 Proposal".into(),
            client: Some("Globe".into()),
            selection,
            adjustments: vec!["+10%".parse().unwrap()],
            currency: None,
            durations: vec!["3".parse().unwrap(), "6:10%".parse().unwrap()],
            include_media: false,
        }
    }

    fn inventory() -> Vec<Site> {
        vec![
            site("EDSA-001", "Makati", 100_000.0),
            site("EDSA-002", "Pasig", 200_000.0),
            site("SLEX-010", "Makati", 50_000.0),
        ]
    }

    #[test]
    fn explicit_codes_keep_order_and_dedupe() {
        let req = request(SiteSelection::Codes(vec![
            "slex-010".into(),
            "EDSA-001".into(),
            "SLEX-010".into(),
        ]));
        let deck = build_deck(&req, &inventory(), "PHP", today()).unwrap();

        let codes: Vec<&str> = deck.slides.iter().map(|s| s.site.code.as_str()).collect();
        assert_eq!(codes, vec!["SLEX-010", "EDSA-001"]);
        assert_eq!(deck.currency, "PHP");
        assert_eq!(deck.totals.sites, 2);
        assert!((deck.totals.base - 150_000.0).abs() < 1e-9);
        assert!((deck.totals.adjusted - 165_000.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_codes_are_reported_together() {
        let req = request(SiteSelection::Codes(vec!["EDSA-001".into(), "NOPE-1".into(), "NOPE-2".into()]));
        match build_deck(&req, &inventory(), "PHP", today()) {
            Err(CoreError::NotFound { identifier, .. }) => assert_eq!(identifier, "NOPE-1, NOPE-2"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn filter_selection_with_currency_and_rates() {
        let mut req = request(SiteSelection::Filter(FilterState {
            areas: BTreeSet::from(["Makati".to_string()]),
            ..FilterState::default()
        }));
        req.currency = Some(CurrencyConversion::new("USD", 55.0).unwrap());

        let deck = build_deck(&req, &inventory(), "PHP", today()).unwrap();
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.currency, "USD");
        assert_eq!(deck.exchange_rate, Some(55.0));

        let slide = &deck.slides[0];
        assert_eq!(slide.site.code, "EDSA-001");
        assert!((slide.adjusted_price - 110_000.0).abs() < 1e-9);
        assert!((slide.display_price - 2_000.0).abs() < 1e-9);
        assert_eq!(slide.rates.len(), 2);
        assert!((slide.rates[1].monthly_rate - 1_800.0).abs() < 1e-9);
        assert!((slide.rates[1].total - 10_800.0).abs() < 1e-9);
    }

    #[test]
    fn flat_duration_discounts_are_in_the_base_currency() {
        let mut req = request(SiteSelection::Codes(vec!["EDSA-001".into()]));
        req.currency = Some(CurrencyConversion::new("USD", 55.0).unwrap());
        req.durations = vec!["12:22000".parse().unwrap()];

        let deck = build_deck(&req, &inventory(), "PHP", today()).unwrap();
        let row = deck.slides[0].rates[0];
        assert_eq!(row.months, 12);
        assert!((row.monthly_rate - 1_600.0).abs() < 1e-9);
        assert!((row.total - 19_200.0).abs() < 1e-9);
    }

    #[test]
    fn site_scoped_adjustments_follow_case_insensitive_selection() {
        let mut req = request(SiteSelection::Codes(vec!["slex-010".into()]));
        req.adjustments = vec!["-1000@slex-010".parse().unwrap()];

        let deck = build_deck(&req, &inventory(), "PHP", today()).unwrap();
        assert!((deck.slides[0].adjusted_price - 49_000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let req = request(SiteSelection::Filter(FilterState {
            areas: BTreeSet::from(["Cebu".to_string()]),
            ..FilterState::default()
        }));
        assert!(matches!(
            build_deck(&req, &inventory(), "PHP", today()),
            Err(CoreError::ValidationFailed { .. })
        ));
    }
}
