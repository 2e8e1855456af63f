//! InMemoryDocumentStore - テスト・ローカル用のドキュメントストア

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::{ProcessingRecord, RecordFields};
use crate::ports::{Clock, DocumentStore, StoreError, SystemClock};

pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, ProcessingRecord>>,
    clock: Arc<dyn Clock>,
    calls: AtomicUsize,
    /// Some なら get / set が常に失敗する
    fail_with: Option<String>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            clock,
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    /// 常に StoreError::Backend を返すストア（障害の再現用）
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new()
        }
    }

    /// 保存済みドキュメントを直接読む（呼び出し回数に数えない）
    pub async fn snapshot(&self, key: &str) -> Option<ProcessingRecord> {
        self.documents.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// get / set の合計呼び出し回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<ProcessingRecord>, StoreError> {
        self.check_available()?;
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, fields: RecordFields) -> Result<ProcessingRecord, StoreError> {
        self.check_available()?;
        let record = fields.stamp(self.clock.now());
        self.documents
            .write()
            .await
            .insert(key.to_string(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableSummary;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn fields(rows: u64) -> RecordFields {
        RecordFields::new("bkt", "data.csv", &TableSummary::new(rows, vec!["x".to_string()]))
    }

    #[tokio::test]
    async fn set_stamps_with_store_clock() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let store = InMemoryDocumentStore::with_clock(Arc::new(FixedClock::new(at)));

        assert!(store.get("data.csv").await.unwrap().is_none());
        let record = store.set("data.csv", fields(1)).await.unwrap();

        assert_eq!(record.processed_at, at);
        assert_eq!(store.get("data.csv").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn set_overwrites_instead_of_merging() {
        let store = InMemoryDocumentStore::new();
        store.set("data.csv", fields(1)).await.unwrap();
        store.set("data.csv", fields(5)).await.unwrap();

        let record = store.snapshot("data.csv").await.unwrap();
        assert_eq!(record.rows_processed, 5);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryDocumentStore::unavailable("deadline exceeded");

        assert!(matches!(
            store.get("data.csv").await,
            Err(StoreError::Backend(_))
        ));
        assert!(store.set("data.csv", fields(1)).await.is_err());
        assert!(store.is_empty().await);
        assert_eq!(store.calls(), 2);
    }
}
