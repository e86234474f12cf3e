//! Whole-document persistence
//!
//! Every mutation rewrites the full document. Writes go through a sibling
//! temp file so the backing file is always either the previous or the new
//! document, never a partial one:
//! 1. Serialize to a pretty-printed buffer
//! 2. Write the temp file (fsync if enabled)
//! 3. Rename temp to final
//!
//! The caller commits its in-memory state only after `write_document`
//! returns `Ok`.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::document::Document;
use super::errors::{StoreError, StoreResult};

/// Returns the temp path used while rewriting `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serializes the document as 2-space indented JSON.
pub fn serialize(document: &Document) -> serde_json::Result<Vec<u8>> {
    let mut buffer = serde_json::to_vec_pretty(document)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Atomically replaces the file at `path` with the serialized document.
pub fn write_document(path: &Path, document: &Document, fsync: bool) -> StoreResult<()> {
    let buffer = serialize(document).map_err(|e| StoreError::WriteFailed {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let temp = temp_path(path);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)
        .map_err(|e| StoreError::CreateFailed {
            path: temp.clone(),
            source: e,
        })?;

    file.write_all(&buffer).map_err(|e| StoreError::WriteFailed {
        path: temp.clone(),
        source: e,
    })?;

    if fsync {
        file.sync_all().map_err(|e| StoreError::WriteFailed {
            path: temp.clone(),
            source: e,
        })?;
    }
    drop(file);

    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        StoreError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    // Make the rename itself durable
    if fsync {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
    }

    Ok(())
}

/// Reads and parses the document at `path`.
pub fn read_document(path: &Path) -> StoreResult<Document> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
