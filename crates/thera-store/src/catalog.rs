//! Static work corpus loaded from a JSON file
//!
//! ```json
//! [
//!   {"name": "aspirin", "excerpts": [{"id": "12345678", "text": "..."}]},
//!   {"name": "lisinopril", "description": "An ACE inhibitor."}
//! ]
//! ```

use crate::StoreError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thera_domain::traits::WorkCatalog;
use thera_domain::{Excerpt, WorkItem};
use tracing::info;

#[derive(Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    excerpts: Vec<CatalogExcerpt>,
}

#[derive(Deserialize)]
struct CatalogExcerpt {
    id: String,
    text: String,
}

impl CatalogEntry {
    fn into_work_item(self) -> WorkItem {
        if self.excerpts.is_empty() {
            WorkItem::with_description(self.name, self.description.unwrap_or_default())
        } else {
            let excerpts = self
                .excerpts
                .into_iter()
                .map(|e| Excerpt {
                    citation_id: e.id.trim().to_string(),
                    text: e.text,
                })
                .collect();
            WorkItem::with_excerpts(self.name, excerpts)
        }
    }
}

/// Work catalog backed by one JSON array
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// Catalog stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> StoreError {
        StoreError::CatalogUnavailable(format!("{}: {}", self.path.display(), reason))
    }
}

impl WorkCatalog for JsonCatalog {
    type Error = StoreError;

    fn load_all(&self) -> Result<Vec<WorkItem>, StoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&contents).map_err(|e| self.unavailable(e))?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(entries.len());
        for (position, mut entry) in entries.into_iter().enumerate() {
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                return Err(self.unavailable(format!("entry {} has an empty name", position)));
            }
            if !seen.insert(entry.name.clone()) {
                return Err(self.unavailable(format!("duplicate name '{}'", entry.name)));
            }
            items.push(entry.into_work_item());
        }

        items.sort_by(|a, b| a.id.cmp(&b.id));
        info!(path = %self.path.display(), items = items.len(), "Loaded work catalog");
        Ok(items)
    }
}
