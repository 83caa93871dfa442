//! Core data types shared by the catalog, cache, and search pipeline.

use serde::{Deserialize, Serialize};

/// Where a source's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A delimited file on the local filesystem.
    Local,
    /// A published spreadsheet reachable over HTTP.
    Remote,
}

/// Persisted configuration record for one aliased source.
///
/// The alias is the unique key within the catalog; registering a descriptor
/// under an existing alias replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub alias: String,
    pub kind: SourceKind,
    /// File path for [`SourceKind::Local`], URL for [`SourceKind::Remote`].
    pub location: String,
    /// Zero-based index of the column queries run against.
    /// `None` (or an out-of-bounds index) falls back to column 0.
    #[serde(default)]
    pub search_column: Option<usize>,
    /// Zero-based indices of the columns shown in result details.
    /// Empty means "all columns"; out-of-bounds indices are skipped.
    #[serde(default)]
    pub result_columns: Vec<usize>,
    /// One-based row number whose cells become column names. Rows above it
    /// are discarded at parse time.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    /// Cap on the number of results a search returns.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub(crate) fn default_header_row() -> usize {
    1
}

pub(crate) fn default_max_results() -> usize {
    10
}

impl SourceDescriptor {
    /// A descriptor with the default column/header/limit settings.
    pub fn new(alias: impl Into<String>, kind: SourceKind, location: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            kind,
            location: location.into(),
            search_column: None,
            result_columns: Vec::new(),
            header_row: default_header_row(),
            max_results: default_max_results(),
        }
    }
}

/// In-memory snapshot of one source's rows at one header-row interpretation.
///
/// Columns are addressed by position, never by name: column names are not
/// required to be unique, so positional access is the only unambiguous
/// resolution. Cells are always present: rows shorter than the header are
/// padded with empty strings at load time, so downstream string matching
/// never sees a missing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of columns, as defined by the header row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Cell at (row, column). Rows are padded to the header width at load,
    /// so this only returns `None` for genuinely out-of-range indices.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// One formatted match, produced fresh per query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// The matched cell's text, from the search column.
    pub primary: String,
    /// `"column: value"` pairs for the other display columns, joined with
    /// `" | "`. Empty when the search column is the only display column.
    pub details: String,
}
