// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file persistence shared by the profile store and the vector index.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mnemo_core::MnemoError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

/// How a document is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JsonLayout {
    /// Indented; for documents people read.
    Pretty,
    /// Single line; for bulk data such as embedding vectors.
    Compact,
}

/// Writes `value` as JSON to a sibling temp file, then renames it over
/// `path`. Readers never observe a half-written document.
pub(crate) async fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
    layout: JsonLayout,
) -> Result<(), MnemoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(MnemoError::storage)?;
    }

    let json = match layout {
        JsonLayout::Pretty => serde_json::to_vec_pretty(value),
        JsonLayout::Compact => serde_json::to_vec(value),
    }
    .map_err(MnemoError::storage)?;
    let temp_path = temp_path_for(path);

    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(MnemoError::storage)?;
    file.write_all(&json).await.map_err(MnemoError::storage)?;
    file.sync_all().await.map_err(MnemoError::storage)?;
    drop(file);

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(MnemoError::storage)
}

/// Reads and parses a JSON file; `Ok(None)` when it does not exist.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, MnemoError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(MnemoError::storage),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MnemoError::storage(e)),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_and_no_temp_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/doc.json");

        write_json_atomic(&path, &serde_json::json!({"a": 1}), JsonLayout::Pretty)
            .await
            .unwrap();
        let value: Option<serde_json::Value> = read_json(&path).await.unwrap();
        assert_eq!(value.unwrap()["a"], 1);
        assert!(!dir.path().join("nested/doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn compact_layout_is_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.json");
        let value = serde_json::json!({"embedding": [0.25, -0.5, 1.0]});

        write_json_atomic(&path, &value, JsonLayout::Compact).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, r#"{"embedding":[0.25,-0.5,1.0]}"#);
        assert_eq!(read_json::<serde_json::Value>(&path).await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<serde_json::Value> = read_json(&dir.path().join("nope.json")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_json::<serde_json::Value>(&path).await.unwrap_err();
        assert!(matches!(err, MnemoError::Storage { .. }));
    }
}
