// ── Keyed reactive collection ──
//
// Concurrent storage with O(1) lookups and a sorted `watch` snapshot that
// is rebuilt after every refresh.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A concurrent collection of one entity type, keyed by its natural id.
///
/// The snapshot is sorted by key so listings come out in a stable order.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Upsert every incoming entity, then drop keys that were not in the
    /// batch. Publishes a single snapshot, and never passes through an
    /// empty state.
    pub(crate) fn upsert_and_prune(&self, items: Vec<(String, T)>) -> RefreshStats {
        let incoming: HashSet<String> = items.iter().map(|(k, _)| k.clone()).collect();
        let mut stats = RefreshStats::default();

        for (key, entity) in items {
            if self.by_key.insert(key, Arc::new(entity)).is_none() {
                stats.added += 1;
            } else {
                stats.updated += 1;
            }
        }
        self.by_key.retain(|key, _| {
            let keep = incoming.contains(key);
            if !keep {
                stats.removed += 1;
            }
            keep
        });

        self.publish();
        stats
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn publish(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values: Vec<Arc<T>> = entries.into_iter().map(|(_, v)| v).collect();

        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

/// What a bulk refresh changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}
