//! Durable source catalog.
//!
//! The catalog is the single writer of its backing store: a JSON document
//! holding one record per registered source, read fully at startup and
//! rewritten fully on every mutation. A failed write rolls the in-memory
//! state back, so memory and disk never diverge.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TabQueryError};
use crate::model::SourceDescriptor;

/// On-disk shape of the catalog document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    sources: Vec<SourceDescriptor>,
}

pub struct Catalog {
    path: PathBuf,
    sources: Vec<SourceDescriptor>,
}

impl Catalog {
    /// Load the catalog from `path`. A missing file is an empty catalog; an
    /// unreadable or malformed one is logged and treated as empty rather
    /// than blocking startup, matching interactive-use expectations.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sources = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<CatalogDocument>(&text) {
                Ok(doc) => doc.sources,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed catalog, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable catalog, starting empty");
                Vec::new()
            }
        };
        Self { path, sources }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a descriptor, replacing any existing one with the same
    /// alias. The updated catalog is persisted before this returns; on a
    /// persist failure the in-memory change is rolled back.
    pub fn register(&mut self, descriptor: SourceDescriptor) -> Result<()> {
        let previous = std::mem::take(&mut self.sources);
        self.sources = previous
            .iter()
            .filter(|s| s.alias != descriptor.alias)
            .cloned()
            .collect();
        self.sources.push(descriptor);

        if let Err(e) = self.persist() {
            self.sources = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Remove the descriptor for `alias` and persist. Fails with
    /// [`TabQueryError::UnknownSource`] if the alias is not registered, and
    /// rolls back on a persist failure.
    pub fn unregister(&mut self, alias: &str) -> Result<()> {
        if !self.sources.iter().any(|s| s.alias == alias) {
            return Err(TabQueryError::UnknownSource(alias.to_string()));
        }

        let previous = self.sources.clone();
        self.sources.retain(|s| s.alias != alias);

        if let Err(e) = self.persist() {
            self.sources = previous;
            return Err(e);
        }
        Ok(())
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn get(&self, alias: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.alias == alias)
    }

    /// Rewrite the whole catalog document. Writes to a sibling temp file
    /// first and renames it into place so a crash mid-write cannot leave a
    /// truncated catalog behind.
    fn persist(&self) -> Result<()> {
        let persist_err = |message: String| TabQueryError::Persistence {
            path: self.path.clone(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
            }
        }

        let doc = CatalogDocument {
            sources: self.sources.clone(),
        };
        let json =
            serde_json::to_string_pretty(&doc).map_err(|e| persist_err(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| persist_err(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| persist_err(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceKind;
    use tempfile::TempDir;

    fn descriptor(alias: &str) -> SourceDescriptor {
        SourceDescriptor::new(alias, SourceKind::Local, format!("/data/{alias}.csv"))
    }

    #[test]
    fn register_persists_and_reloads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");

        let mut catalog = Catalog::open(&path);
        catalog.register(descriptor("crm")).unwrap();
        catalog.register(descriptor("orders")).unwrap();

        let reopened = Catalog::open(&path);
        let aliases: Vec<&str> = reopened.list().iter().map(|s| s.alias.as_str()).collect();
        assert_eq!(aliases, vec!["crm", "orders"]);
    }

    #[test]
    fn register_same_alias_replaces() {
        let tmp = TempDir::new().unwrap();
        let mut catalog = Catalog::open(tmp.path().join("catalog.json"));

        catalog.register(descriptor("crm")).unwrap();
        let mut updated = descriptor("crm");
        updated.search_column = Some(2);
        updated.max_results = 3;
        catalog.register(updated.clone()).unwrap();

        let matches: Vec<_> = catalog
            .list()
            .iter()
            .filter(|s| s.alias == "crm")
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(*matches[0], updated);
    }

    #[test]
    fn unregister_removes_and_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");

        let mut catalog = Catalog::open(&path);
        catalog.register(descriptor("crm")).unwrap();
        catalog.unregister("crm").unwrap();
        assert!(catalog.get("crm").is_none());

        let reopened = Catalog::open(&path);
        assert!(reopened.list().is_empty());
    }

    #[test]
    fn unregister_unknown_alias_fails() {
        let tmp = TempDir::new().unwrap();
        let mut catalog = Catalog::open(tmp.path().join("catalog.json"));
        let err = catalog.unregister("ghost").unwrap_err();
        assert!(matches!(err, TabQueryError::UnknownSource(_)));
    }

    #[test]
    fn failed_persist_rolls_back_register() {
        let tmp = TempDir::new().unwrap();
        // A directory at the catalog path makes the rename fail.
        let path = tmp.path().join("catalog.json");
        fs::create_dir_all(&path).unwrap();

        let mut catalog = Catalog::open(&path);
        let err = catalog.register(descriptor("crm")).unwrap_err();
        assert!(matches!(err, TabQueryError::Persistence { .. }));
        assert!(catalog.get("crm").is_none());
    }

    #[test]
    fn failed_persist_rolls_back_unregister() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");

        let mut catalog = Catalog::open(&path);
        catalog.register(descriptor("crm")).unwrap();

        // Replace the catalog file with a directory so the rename fails.
        fs::remove_file(&path).unwrap();
        fs::create_dir_all(&path).unwrap();

        let err = catalog.unregister("crm").unwrap_err();
        assert!(matches!(err, TabQueryError::Persistence { .. }));
        assert!(catalog.get("crm").is_some());
    }

    #[test]
    fn malformed_catalog_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(&path, "not json").unwrap();

        let catalog = Catalog::open(&path);
        assert!(catalog.list().is_empty());
    }
}
