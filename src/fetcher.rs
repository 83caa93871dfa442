//! Resolves a source descriptor to raw bytes.
//!
//! Local sources are a straight file read; remote sources are a single
//! synchronous HTTP GET. No retries happen here; retry policy, if any,
//! belongs to the caller.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Result, TabQueryError};
use crate::model::{SourceDescriptor, SourceKind};

const USER_AGENT: &str = concat!("tabquery/", env!("CARGO_PKG_VERSION"));

pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Fetch the source's full payload as bytes.
    ///
    /// Fails with [`TabQueryError::SourceUnavailable`] on any I/O failure:
    /// missing file, network error, timeout, or non-2xx HTTP status.
    pub fn fetch(&self, descriptor: &SourceDescriptor) -> Result<Vec<u8>> {
        match descriptor.kind {
            SourceKind::Local => self.fetch_local(&descriptor.location),
            SourceKind::Remote => self.fetch_remote(&descriptor.location),
        }
    }

    fn fetch_local(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path)
            .map_err(|e| TabQueryError::SourceUnavailable(format!("{path}: {e}")))
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let url = export_url(url);
        debug!(%url, "fetching remote sheet");

        let response = self
            .client
            .get(url.as_ref())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| TabQueryError::SourceUnavailable(e.to_string()))?;

        let body = response
            .bytes()
            .map_err(|e| TabQueryError::SourceUnavailable(e.to_string()))?;

        // Published-sheet exports are UTF-8; force that interpretation up
        // front so the reader never misdiagnoses a remote payload as a
        // legacy encoding.
        Ok(String::from_utf8_lossy(&body).into_owned().into_bytes())
    }
}

/// Rewrite a sheet's interactive `/edit` URL to its CSV export endpoint.
/// URLs that already point at an export (or anything else) pass through.
fn export_url(url: &str) -> std::borrow::Cow<'_, str> {
    if url.contains("/edit") {
        std::borrow::Cow::Owned(url.replacen("/edit", "/export?format=csv", 1))
    } else {
        std::borrow::Cow::Borrowed(url)
    }
}
