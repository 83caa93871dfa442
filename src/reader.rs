//! Encoding-resilient delimited-text parsing.
//!
//! Payloads arrive as raw bytes from whatever the fetcher produced, and
//! legacy exports are frequently not UTF-8. Candidate encodings are tried in
//! strict priority order (UTF-8, then Latin-1, then Windows-1252) and the
//! first one that decodes cleanly wins. UTF-8 is the modern default; Latin-1
//! accepts any byte sequence, which makes it the practical fallback for
//! Western-European legacy files; Windows-1252 stays in the chain as the
//! targeted interpretation for Windows-authored files.

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Result, TabQueryError};
use crate::model::Table;

/// Parse raw bytes into a [`Table`], treating the 1-based `header_row` as
/// the header line and discarding every row above it.
///
/// Missing cells (rows shorter than the header) are normalized to empty
/// strings so downstream matching never deals with absent values.
pub fn parse(bytes: &[u8], header_row: usize) -> Result<Table> {
    let text = decode(bytes)?;
    parse_text(&text, header_row)
}

/// Candidate decoders in strict priority order. Latin-1 accepts any byte
/// sequence, so in practice the chain ends there; Windows-1252 stays listed
/// to keep the fallback order explicit and auditable.
const CANDIDATES: [(&str, fn(&[u8]) -> Option<String>); 3] = [
    ("utf-8", try_utf8),
    ("latin-1", try_latin1),
    ("windows-1252", try_windows1252),
];

fn decode(bytes: &[u8]) -> Result<String> {
    for (name, decoder) in CANDIDATES {
        if let Some(text) = decoder(bytes) {
            if name != "utf-8" {
                debug!(encoding = name, "payload is not valid UTF-8, using fallback encoding");
            }
            return Ok(text);
        }
    }
    Err(TabQueryError::Decode(
        "no candidate encoding decoded the payload".into(),
    ))
}

fn try_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// Latin-1 maps every byte to the code point of the same value.
fn try_latin1(bytes: &[u8]) -> Option<String> {
    Some(bytes.iter().map(|&b| b as char).collect())
}

/// Targeted interpretation for Windows-authored files whose high bytes
/// differ from Latin-1 (smart quotes, dashes, the euro sign).
fn try_windows1252(bytes: &[u8]) -> Option<String> {
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    (!had_errors).then(|| text.into_owned())
}

fn parse_text(text: &str, header_row: usize) -> Result<Table> {
    // Drop the rows above the header line before handing off to the CSV
    // reader: preamble rows may not even be delimited consistently.
    let effective: String = if header_row > 1 {
        text.lines()
            .skip(header_row - 1)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.to_string()
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(effective.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| TabQueryError::Decode(format!("unreadable header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.is_empty() {
        return Err(TabQueryError::Decode("payload has no header row".into()));
    }

    let width = columns.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| TabQueryError::Decode(format!("malformed record: {e}")))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        // Normalize ragged rows to the header width, growing or shrinking.
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(Table { columns, rows })
}
