//! Per-alias table cache.
//!
//! Holds at most one materialized [`Table`] per alias. There is no LRU or
//! size bound: the source catalog is sized for interactive use, not bounded
//! memory. Entries are filled lazily on first access and evicted explicitly
//! when a source is removed or reconfigured.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::model::Table;

#[derive(Default)]
pub struct TableCache {
    tables: Mutex<HashMap<String, Arc<Table>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `alias`, loading and storing it via
    /// `loader` on a miss. A failed load leaves the cache unpopulated and
    /// propagates the error.
    ///
    /// The map lock is held across the load, so concurrent first accesses
    /// for the same alias populate the slot at most once and never fetch
    /// the same source twice.
    pub fn get_or_load<F>(&self, alias: &str, loader: F) -> Result<Arc<Table>>
    where
        F: FnOnce() -> Result<Table>,
    {
        let mut tables = self.tables.lock().unwrap();
        if let Some(table) = tables.get(alias) {
            debug!(alias, "table cache hit");
            return Ok(Arc::clone(table));
        }

        debug!(alias, "table cache miss, loading");
        let table = Arc::new(loader()?);
        tables.insert(alias.to_string(), Arc::clone(&table));
        Ok(table)
    }

    /// Drop any cached table for `alias`. No-op if absent.
    pub fn invalidate(&self, alias: &str) {
        if self.tables.lock().unwrap().remove(alias).is_some() {
            debug!(alias, "evicted cached table");
        }
    }

    /// Drop every cached table.
    pub fn invalidate_all(&self) {
        self.tables.lock().unwrap().clear();
    }

    /// Whether a table is currently cached for `alias`.
    pub fn contains(&self, alias: &str) -> bool {
        self.tables.lock().unwrap().contains_key(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabQueryError;

    fn sample_table() -> Table {
        Table {
            columns: vec!["id".into()],
            rows: vec![vec!["1".into()]],
        }
    }

    #[test]
    fn loads_once_then_hits() {
        let cache = TableCache::new();
        let mut loads = 0;

        for _ in 0..3 {
            let table = cache
                .get_or_load("crm", || {
                    loads += 1;
                    Ok(sample_table())
                })
                .unwrap();
            assert_eq!(table.rows.len(), 1);
        }
        assert_eq!(loads, 1);
    }

    #[test]
    fn failed_load_does_not_populate() {
        let cache = TableCache::new();

        let err = cache
            .get_or_load("crm", || {
                Err(TabQueryError::SourceUnavailable("gone".into()))
            })
            .unwrap_err();
        assert!(matches!(err, TabQueryError::SourceUnavailable(_)));
        assert!(!cache.contains("crm"));

        // A later successful load still works.
        cache.get_or_load("crm", || Ok(sample_table())).unwrap();
        assert!(cache.contains("crm"));
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache = TableCache::new();
        cache.get_or_load("crm", || Ok(sample_table())).unwrap();
        cache.invalidate("crm");
        assert!(!cache.contains("crm"));

        let mut reloaded = false;
        cache
            .get_or_load("crm", || {
                reloaded = true;
                Ok(sample_table())
            })
            .unwrap();
        assert!(reloaded);
    }

    #[test]
    fn invalidate_absent_alias_is_a_noop() {
        let cache = TableCache::new();
        cache.invalidate("nothing");
    }

    #[test]
    fn invalidate_all_clears_every_alias() {
        let cache = TableCache::new();
        cache.get_or_load("a", || Ok(sample_table())).unwrap();
        cache.get_or_load("b", || Ok(sample_table())).unwrap();
        cache.invalidate_all();
        assert!(!cache.contains("a"));
        assert!(!cache.contains("b"));
    }
}
