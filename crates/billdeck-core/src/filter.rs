// ── Site filter engine ──
//
// A `FilterState` maps each category (area, landmark, price, availability,
// owner, free-text search) to the values the user selected. The visible
// site list is the conjunction of every active category.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Site;
use crate::pricing::PriceRange;

/// Inclusive availability window. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.until.is_none()
    }

    /// A site with no availability date is free today, so it matches any
    /// window that has started by `today`.
    fn admits(&self, available_from: Option<NaiveDate>, today: NaiveDate) -> bool {
        match available_from {
            Some(date) => {
                self.from.is_none_or(|from| date >= from)
                    && self.until.is_none_or(|until| date <= until)
            }
            None => self.from.is_none_or(|from| from <= today),
        }
    }
}

/// One compiled filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SitePredicate<'a> {
    /// Case-insensitive membership of the site's area.
    Area(&'a BTreeSet<String>),
    /// Any of the site's landmarks is in the set.
    Landmark(&'a BTreeSet<String>),
    Owner(&'a BTreeSet<String>),
    Price(PriceRange),
    Availability { window: DateWindow, today: NaiveDate },
    /// Lowercased needle.
    Text(String),
}

impl SitePredicate<'_> {
    pub fn matches(&self, site: &Site) -> bool {
        match self {
            Self::Area(areas) => site
                .area
                .as_deref()
                .is_some_and(|area| contains_ignore_case(areas, area)),
            Self::Landmark(landmarks) => site
                .landmarks
                .iter()
                .any(|lm| contains_ignore_case(landmarks, lm)),
            Self::Owner(owners) => site
                .owner
                .as_deref()
                .is_some_and(|owner| contains_ignore_case(owners, owner)),
            Self::Price(range) => range.contains(site.price),
            Self::Availability { window, today } => window.admits(site.available_from, *today),
            Self::Text(needle) => searchable_fields(site).any(|f| f.to_lowercase().contains(needle)),
        }
    }
}

fn contains_ignore_case(set: &BTreeSet<String>, value: &str) -> bool {
    set.iter().any(|v| v.eq_ignore_ascii_case(value))
}

fn searchable_fields(site: &Site) -> impl Iterator<Item = &str> {
    [Some(site.code.as_str()), site.name.as_deref(), site.area.as_deref()]
        .into_iter()
        .flatten()
        .chain(site.landmarks.iter().map(String::as_str))
}

/// The user's current selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub areas: BTreeSet<String>,
    #[serde(default)]
    pub landmarks: BTreeSet<String>,
    #[serde(default)]
    pub owners: BTreeSet<String>,
    #[serde(default)]
    pub price: PriceRange,
    #[serde(default)]
    pub availability: DateWindow,
    #[serde(default)]
    pub search: Option<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.predicates(NaiveDate::MIN).is_empty()
    }

    /// Active predicates only. Empty categories impose nothing.
    pub fn predicates(&self, today: NaiveDate) -> Vec<SitePredicate<'_>> {
        let mut out = Vec::new();
        if !self.areas.is_empty() {
            out.push(SitePredicate::Area(&self.areas));
        }
        if !self.landmarks.is_empty() {
            out.push(SitePredicate::Landmark(&self.landmarks));
        }
        if !self.owners.is_empty() {
            out.push(SitePredicate::Owner(&self.owners));
        }
        if !self.price.is_unbounded() {
            out.push(SitePredicate::Price(self.price));
        }
        if !self.availability.is_unbounded() {
            out.push(SitePredicate::Availability {
                window: self.availability,
                today,
            });
        }
        if let Some(needle) = self.search.as_deref().map(str::trim) {
            if !needle.is_empty() {
                out.push(SitePredicate::Text(needle.to_lowercase()));
            }
        }
        out
    }

    pub fn matches(&self, site: &Site, today: NaiveDate) -> bool {
        self.predicates(today).iter().all(|p| p.matches(site))
    }

    /// Sites passing every active predicate, in input order.
    pub fn apply<'s>(&self, sites: &'s [Site], today: NaiveDate) -> Vec<&'s Site> {
        let predicates = self.predicates(today);
        sites
            .iter()
            .filter(|site| predicates.iter().all(|p| p.matches(site)))
            .collect()
    }

    /// Distinct values per category across `sites`.
    pub fn options(sites: &[Site]) -> FilterOptions {
        let mut opts = FilterOptions::default();
        for site in sites {
            if let Some(area) = &site.area {
                opts.areas.insert(area.clone());
            }
            if let Some(owner) = &site.owner {
                opts.owners.insert(owner.clone());
            }
            opts.landmarks.extend(site.landmarks.iter().cloned());
            opts.price.min = Some(opts.price.min.map_or(site.price, |m| m.min(site.price)));
            opts.price.max = Some(opts.price.max.map_or(site.price, |m| m.max(site.price)));
        }
        opts
    }
}

/// Selectable values derived from an inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub areas: BTreeSet<String>,
    pub landmarks: BTreeSet<String>,
    pub owners: BTreeSet<String>,
    /// Observed price bounds. Unbounded for an empty inventory.
    pub price: PriceRange,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn site(code: &str, area: &str, price: f64, owner: &str) -> Site {
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
            owner: Some(owner.into()),
            available_from: None,
            image_url: None,
        }
    }

    fn inventory() -> Vec<Site> {
        let mut a = site("EDSA-001", "Makati", 250_000.0, "Acme");
        a.landmarks = vec!["Ayala Avenue".into(), "Glorietta".into()];
        let mut b = site("EDSA-002", "Quezon City", 180_000.0, "Skyline");
        b.available_from = Some(date(2026, 12, 1));
        b.name = Some("Cubao Flyover".into());
        let mut c = site("SLEX-010", "Makati", 90_000.0, "Skyline");
        c.landmarks = vec!["Magallanes".into()];
        c.available_from = Some(date(2027, 3, 1));
        vec![a, b, c]
    }

    fn codes(sites: &[&Site]) -> Vec<String> {
        sites.iter().map(|s| s.code.clone()).collect()
    }

    fn today() -> NaiveDate {
        date(2026, 10, 14)
    }

    #[test]
    fn empty_filter_returns_everything() {
        let sites = inventory();
        let filter = FilterState::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sites, today()).len(), 3);
    }

    #[test]
    fn categories_combine_as_conjunction() {
        let sites = inventory();
        let filter = FilterState {
            areas: BTreeSet::from(["makati".to_string()]),
            owners: BTreeSet::from(["Skyline".to_string()]),
            ..FilterState::default()
        };
        assert_eq!(codes(&filter.apply(&sites, today())), vec!["SLEX-010"]);
    }

    #[test]
    fn empty_when_any_predicate_matches_nothing() {
        let sites = inventory();
        let filter = FilterState {
            areas: BTreeSet::from(["Makati".to_string()]),
            owners: BTreeSet::from(["Nobody Outdoor".to_string()]),
            ..FilterState::default()
        };
        assert!(filter.apply(&sites, today()).is_empty());
    }

    #[test]
    fn landmark_matches_any_selected() {
        let sites = inventory();
        let filter = FilterState {
            landmarks: BTreeSet::from(["glorietta".to_string(), "Magallanes".to_string()]),
            ..FilterState::default()
        };
        assert_eq!(codes(&filter.apply(&sites, today())), vec!["EDSA-001", "SLEX-010"]);
    }

    #[test]
    fn price_range_is_inclusive() {
        let sites = inventory();
        let filter = FilterState {
            price: PriceRange {
                min: Some(90_000.0),
                max: Some(180_000.0),
            },
            ..FilterState::default()
        };
        assert_eq!(codes(&filter.apply(&sites, today())), vec!["EDSA-002", "SLEX-010"]);
    }

    #[test]
    fn availability_window_treats_missing_date_as_today() {
        let sites = inventory();

        let upcoming = FilterState {
            availability: DateWindow {
                from: None,
                until: Some(date(2026, 12, 31)),
            },
            ..FilterState::default()
        };
        assert_eq!(codes(&upcoming.apply(&sites, today())), vec!["EDSA-001", "EDSA-002"]);

        let next_year = FilterState {
            availability: DateWindow {
                from: Some(date(2027, 1, 1)),
                until: None,
            },
            ..FilterState::default()
        };
        assert_eq!(codes(&next_year.apply(&sites, today())), vec!["SLEX-010"]);
    }

    #[test]
    fn undated_site_matches_window_that_already_closed() {
        let sites = inventory();
        let closed = FilterState {
            availability: DateWindow {
                from: None,
                until: Some(date(2026, 6, 30)),
            },
            ..FilterState::default()
        };
        assert_eq!(codes(&closed.apply(&sites, today())), vec!["EDSA-001"]);

        let started_and_closed = FilterState {
            availability: DateWindow {
                from: Some(date(2026, 1, 1)),
                until: Some(date(2026, 6, 30)),
            },
            ..FilterState::default()
        };
        assert_eq!(codes(&started_and_closed.apply(&sites, today())), vec!["EDSA-001"]);
    }

    #[test]
    fn search_covers_name_and_landmarks() {
        let sites = inventory();
        let by_name = FilterState {
            search: Some("  cubao ".into()),
            ..FilterState::default()
        };
        assert_eq!(codes(&by_name.apply(&sites, today())), vec!["EDSA-002"]);

        let by_landmark = FilterState {
            search: Some("AYALA".into()),
            ..FilterState::default()
        };
        assert_eq!(codes(&by_landmark.apply(&sites, today())), vec!["EDSA-001"]);

        let blank = FilterState {
            search: Some("   ".into()),
            ..FilterState::default()
        };
        assert!(blank.is_empty());
    }

    #[test]
    fn options_collect_distinct_values() {
        let opts = FilterState::options(&inventory());
        assert_eq!(opts.areas.len(), 2);
        assert_eq!(opts.owners.len(), 2);
        assert_eq!(opts.landmarks.len(), 3);
        assert_eq!(opts.price.min, Some(90_000.0));
        assert_eq!(opts.price.max, Some(250_000.0));
    }
}
