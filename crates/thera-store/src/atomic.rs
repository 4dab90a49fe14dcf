//! Write-to-temp-then-rename

use crate::StoreError;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `contents` so readers see either nothing or the whole file
///
/// The temp file lives in the target directory (same file system, so the
/// rename is atomic) and starts with `.` so directory scans skip it.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    Ok(())
}
