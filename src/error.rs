//! Error taxonomy for the source registry and search engine.
//!
//! Callers on the interactive query path generally want degraded results
//! rather than failures, so [`TabQueryError`] keeps the categories coarse:
//! the engine swallows `SourceUnavailable` and `Decode` during a search and
//! only lets `UnknownSource` through as a distinct signal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabQueryError {
    /// The source's bytes could not be obtained: missing file, network
    /// error, timeout, or a non-2xx HTTP status.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Every candidate encoding failed to produce a parseable table.
    #[error("could not decode payload: {0}")]
    Decode(String),

    /// No descriptor is registered under the requested alias.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// The catalog could not be durably written. The in-memory catalog is
    /// rolled back before this is returned.
    #[error("failed to persist catalog to {path}: {message}")]
    Persistence { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, TabQueryError>;
