//! # tabquery
//!
//! Register tabular data sources (local delimited files or remote
//! published spreadsheets) under short aliases, then run fast
//! case-insensitive substring queries against a chosen source's designated
//! column.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────┐
//! │ Catalog  │   │ TableCache  │◀──│ Fetcher  │
//! │ (JSON)   │   │ (per alias) │   │ file/HTTP│
//! └────┬─────┘   └──────┬──────┘   └────┬─────┘
//!      │                │                │
//!      └───────────▶ Engine ◀── Reader ──┘
//!                      │    (encoding fallback)
//!                      ▼
//!              [SearchResult, ...]
//! ```
//!
//! A caller supplies `(alias, query)`; the engine resolves the descriptor
//! from the catalog, materializes the table through the cache (fetch +
//! encoding-resilient parse on a miss), applies the configured header-row
//! interpretation, matches, formats, and truncates.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`model`] | Core data types |
//! | [`catalog`] | Durable alias → descriptor registry |
//! | [`fetcher`] | Local-file and HTTP payload retrieval |
//! | [`reader`] | Encoding-resilient delimited-text parsing |
//! | [`cache`] | Per-alias materialized-table cache |
//! | [`engine`] | The query-to-result pipeline |
//! | [`error`] | Error taxonomy |

pub mod cache;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod reader;

pub use config::{load_config, Config};
pub use engine::Engine;
pub use error::TabQueryError;
pub use model::{SearchResult, SourceDescriptor, SourceKind, Table};
