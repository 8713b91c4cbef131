// ── In-memory data store ──

mod collection;

use std::sync::Arc;

pub use collection::RefreshStats;
use collection::EntityCollection;

use crate::model::Site;

/// Latest known site inventory, keyed by site code.
///
/// The collection is refreshed wholesale with upsert-then-prune so readers
/// never observe a half-empty list.
pub struct DataStore {
    sites: EntityCollection<Site>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            sites: EntityCollection::new(),
        }
    }

    pub fn replace_sites(&self, sites: Vec<Site>) -> RefreshStats {
        self.sites
            .upsert_and_prune(sites.into_iter().map(|s| (s.code.clone(), s)).collect())
    }

    pub fn site(&self, code: &str) -> Option<Arc<Site>> {
        self.sites.get(code)
    }

    /// Owned copies of every site, for the filter and deck engines.
    pub fn sites(&self) -> Vec<Site> {
        self.sites.snapshot().iter().map(|s| (**s).clone()).collect()
    }

    pub fn has_sites(&self) -> bool {
        !self.sites.is_empty()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn site(code: &str) -> Site {
        Site {
            code: code.into(),
            name: None,
            area: None,
            landmarks: Vec::new(),
            latitude: None,
            longitude: None,
            price: 1.0,
            facing: None,
            size: None,
            owner: None,
            available_from: None,
            image_url: None,
        }
    }

    #[test]
    fn replace_sites_prunes_and_sorts() {
        let store = DataStore::new();
        assert!(!store.has_sites());

        store.replace_sites(vec![site("B"), site("A"), site("C")]);
        let stats = store.replace_sites(vec![site("C"), site("A")]);

        assert_eq!(stats.removed, 1);
        let codes: Vec<String> = store.sites().into_iter().map(|s| s.code).collect();
        assert_eq!(codes, vec!["A", "C"]);
        assert!(store.site("B").is_none());
        assert_eq!(store.site("A").unwrap().code, "A");
    }
}
