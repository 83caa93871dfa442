//! The query-to-result pipeline and the wiring that owns it.
//!
//! An [`Engine`] ties the catalog, the table cache, and the fetcher
//! together and exposes the operations a UI collaborator consumes:
//! `register`, `unregister`, `list`, `preload`, and `search`. Presentation,
//! keystroke debouncing, and alias completion live with that collaborator,
//! not here.
//!
//! `search` is a self-contained read pipeline. Tables are immutable once
//! built and shared as `Arc`, so concurrent searches are safe; the catalog
//! sits behind a single writer lock because register/unregister mutate
//! shared durable state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::TableCache;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Result, TabQueryError};
use crate::fetcher::Fetcher;
use crate::model::{SearchResult, SourceDescriptor, Table};
use crate::reader;

pub struct Engine {
    catalog: Mutex<Catalog>,
    cache: TableCache,
    fetcher: Fetcher,
}

impl Engine {
    /// Construct an engine from configuration, reading the persisted
    /// catalog into memory. Mutations persist immediately, so there is no
    /// close-time flush to forget.
    pub fn open(config: &Config) -> Self {
        Self {
            catalog: Mutex::new(Catalog::open(config.catalog.path.clone())),
            cache: TableCache::new(),
            fetcher: Fetcher::new(Duration::from_secs(config.fetch.timeout_secs)),
        }
    }

    /// Register a descriptor, replacing any prior one under the same alias.
    /// Any cached table for the alias is evicted, since the new descriptor's
    /// column and header assumptions may differ.
    pub fn register(&self, descriptor: SourceDescriptor) -> Result<()> {
        let alias = descriptor.alias.clone();
        self.catalog.lock().unwrap().register(descriptor)?;
        self.cache.invalidate(&alias);
        Ok(())
    }

    /// Remove a source and evict its cached table.
    pub fn unregister(&self, alias: &str) -> Result<()> {
        self.catalog.lock().unwrap().unregister(alias)?;
        self.cache.invalidate(alias);
        Ok(())
    }

    /// All registered descriptors in registration order.
    pub fn list(&self) -> Vec<SourceDescriptor> {
        self.catalog.lock().unwrap().list().to_vec()
    }

    pub fn get(&self, alias: &str) -> Option<SourceDescriptor> {
        self.catalog.lock().unwrap().get(alias).cloned()
    }

    /// Materialize a source's table into the cache ahead of the first
    /// query, reporting load errors directly instead of swallowing them.
    pub fn preload(&self, alias: &str) -> Result<Arc<Table>> {
        let descriptor = self
            .get(alias)
            .ok_or_else(|| TabQueryError::UnknownSource(alias.to_string()))?;
        self.cache
            .get_or_load(alias, || self.load(&descriptor, 1))
    }

    /// Search the source's configured column for `query` as a
    /// case-insensitive substring.
    ///
    /// Returns at most `max_results` formatted matches in table order. Load
    /// and decode failures degrade to an empty result with a logged
    /// warning; only an unregistered alias surfaces as an error, so a
    /// caller can distinguish "source not found" from "no matches".
    pub fn search(&self, alias: &str, query: &str) -> Result<Vec<SearchResult>> {
        self.search_with_limit(alias, query, None)
    }

    /// [`search`](Engine::search) with a per-query cap overriding the
    /// descriptor's `max_results`.
    pub fn search_with_limit(
        &self,
        alias: &str,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let descriptor = self
            .get(alias)
            .ok_or_else(|| TabQueryError::UnknownSource(alias.to_string()))?;

        // Callers are expected to clear results instead of querying with an
        // empty string; answer one with no matches rather than scanning.
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let table = match self.resolve_table(alias, &descriptor) {
            Ok(table) => table,
            Err(e) => {
                warn!(alias, error = %e, "table resolution failed, returning no results");
                return Ok(Vec::new());
            }
        };

        let max_results = limit.unwrap_or(descriptor.max_results);
        Ok(run_query(&table, &descriptor, query, max_results))
    }

    /// Resolve the effective table for a search.
    ///
    /// The default interpretation (header row 1) is served from the cache.
    /// A descriptor with `header_row > 1` gets a fresh fetch and parse per
    /// query instead of a second cache slot; the configuration is uncommon
    /// enough that re-deriving it keeps the cache trivially simple. Caching
    /// per header-row interpretation is the obvious optimization if that
    /// assumption stops holding.
    fn resolve_table(&self, alias: &str, descriptor: &SourceDescriptor) -> Result<Arc<Table>> {
        let table = self
            .cache
            .get_or_load(alias, || self.load(descriptor, 1))?;

        if descriptor.header_row > 1 {
            debug!(alias, header_row = descriptor.header_row, "re-reading with configured header row");
            return Ok(Arc::new(self.load(descriptor, descriptor.header_row)?));
        }

        Ok(table)
    }

    fn load(&self, descriptor: &SourceDescriptor, header_row: usize) -> Result<Table> {
        let bytes = self.fetcher.fetch(descriptor)?;
        reader::parse(&bytes, header_row)
    }
}

/// The pure tail of the pipeline: match, project, format, truncate.
fn run_query(
    table: &Table,
    descriptor: &SourceDescriptor,
    query: &str,
    max_results: usize,
) -> Vec<SearchResult> {
    let width = table.width();

    // Out-of-bounds or unset search column falls back to column 0.
    let search_column = descriptor
        .search_column
        .filter(|&i| i < width)
        .unwrap_or(0);

    // Empty result_columns means every column, in table order.
    let display_columns: Vec<usize> = if descriptor.result_columns.is_empty() {
        (0..width).collect()
    } else {
        descriptor
            .result_columns
            .iter()
            .copied()
            .filter(|&i| i < width)
            .collect()
    };

    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for row in &table.rows {
        if results.len() >= max_results {
            break;
        }

        let Some(value) = row.get(search_column) else {
            continue;
        };
        if !value.to_lowercase().contains(&needle) {
            continue;
        }

        // The search column is already shown as `primary`; repeating it in
        // the details would be noise.
        let details: Vec<String> = display_columns
            .iter()
            .filter(|&&i| i != search_column)
            .map(|&i| format!("{}: {}", table.columns[i], row[i]))
            .collect();

        results.push(SearchResult {
            primary: value.clone(),
            details: details.join(" | "),
        });
    }

    results
}
