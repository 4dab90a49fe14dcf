//! One JSON document per work item

use crate::atomic::write_atomic;
use crate::document::StoredResult;
use crate::filename::{id_from_file_name, result_file_name};
use crate::StoreError;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thera_domain::traits::ResultStore;
use thera_domain::ResultSet;
use tracing::{debug, warn};

/// Result store writing `<encoded-id>_result.json` files into one directory
///
/// Several workers may share the directory: each writes disjoint file names
/// and every write is atomic, so no locking is needed.
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    output_dir: PathBuf,
}

impl JsonResultStore {
    /// Store rooted at `output_dir`; the directory is created on first save
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory holding the result files
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the result file for `work_item_id`
    pub fn path_for(&self, work_item_id: &str) -> PathBuf {
        self.output_dir.join(result_file_name(work_item_id))
    }

    /// Read back a persisted result document
    pub fn load_document(&self, work_item_id: &str) -> Result<Option<StoredResult>, StoreError> {
        let contents = match std::fs::read_to_string(self.path_for(work_item_id)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Read back a persisted result set
    pub fn load(&self, work_item_id: &str) -> Result<Option<ResultSet>, StoreError> {
        self.load_document(work_item_id)?
            .map(StoredResult::into_result_set)
            .transpose()
    }
}

impl ResultStore for JsonResultStore {
    type Error = StoreError;

    fn exists(&self, work_item_id: &str) -> bool {
        self.path_for(work_item_id).is_file()
    }

    fn save(&self, result: &ResultSet) -> Result<(), StoreError> {
        let document = StoredResult::from(result);
        let json = serde_json::to_vec_pretty(&document)?;
        let path = self.path_for(&result.work_item_id);

        write_atomic(&path, &json)?;
        debug!(path = %path.display(), bytes = json.len(), "Saved result");
        Ok(())
    }

    fn completed_ids(&self) -> Result<BTreeSet<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match id_from_file_name(name) {
                Some(id) => {
                    ids.insert(id);
                }
                None if name.ends_with(crate::RESULT_SUFFIX) && !name.starts_with('.') => {
                    warn!(file = name, "Skipping result file with an undecodable name");
                }
                None => {}
            }
        }

        Ok(ids)
    }
}
