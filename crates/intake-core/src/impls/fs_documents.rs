//! FsDocumentStore - ディレクトリに JSON ドキュメントを保存する DocumentStore
//!
//! レイアウト:
//!
//! ```text
//! <root>/<collection>/<base64url(key)>.json
//! ```
//!
//! オブジェクト名は `/` を含みうるので、ファイル名には base64url を使います。
//! 書き込みは一時ファイル + rename なので、途中で落ちても壊れたドキュメントは残りません。

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{ProcessingRecord, RecordFields};
use crate::ports::{Clock, DocumentStore, StoreError, SystemClock};

pub struct FsDocumentStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FsDocumentStore {
    /// `root/collection` を保存先にする（ディレクトリは最初の書き込みで作成）
    pub fn new(root: impl AsRef<Path>, collection: &str) -> Self {
        Self::with_clock(root, collection, Arc::new(SystemClock))
    }

    pub fn with_clock(root: impl AsRef<Path>, collection: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: root.as_ref().join(collection),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", URL_SAFE_NO_PAD.encode(key.as_bytes())))
    }
}

fn backend(err: std::io::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<ProcessingRecord>, StoreError> {
        let path = self.document_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(backend(e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn set(&self, key: &str, fields: RecordFields) -> Result<ProcessingRecord, StoreError> {
        let record = fields.stamp(self.clock.now());
        let body = serde_json::to_vec_pretty(&record).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(backend)?;

        let path = self.document_path(key);
        let tmp = path.with_extension(format!("json.{}.tmp", ulid::Ulid::new()));
        tokio::fs::write(&tmp, &body).await.map_err(backend)?;
        tokio::fs::rename(&tmp, &path).await.map_err(backend)?;

        debug!(key, path = %path.display(), "document written");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableSummary;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn fields(name: &str, rows: u64) -> RecordFields {
        RecordFields::new(
            "bkt",
            name,
            &TableSummary::new(rows, vec!["x".to_string(), "y".to_string()]),
        )
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(tmp.path(), "processed_files");
        assert!(store.get("data.csv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_roundtrips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(at));
        let store = FsDocumentStore::with_clock(tmp.path(), "processed_files", clock);

        let written = store.set("dir/data.csv", fields("dir/data.csv", 1)).await.unwrap();
        let read = store.get("dir/data.csv").await.unwrap().unwrap();

        assert_eq!(written, read);
        assert_eq!(read.processed_at, at);
        assert_eq!(read.columns_found, vec!["x", "y"]);
        // slash はファイル名に残らない
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn collections_are_separate_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let a = FsDocumentStore::new(tmp.path(), "a");
        let b = FsDocumentStore::new(tmp.path(), "b");

        a.set("data.csv", fields("data.csv", 1)).await.unwrap();
        assert!(b.get("data.csv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_document_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(tmp.path(), "processed_files");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.document_path("data.csv"), b"{not json").unwrap();

        let err = store.get("data.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { key, .. } if key == "data.csv"));
    }
}
