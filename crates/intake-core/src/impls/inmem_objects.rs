//! InMemoryObjectFetcher - テスト・ローカル用のオブジェクトストレージ
//!
//! 呼び出し回数を数えるので「ストレージに触れていない」ことをテストで確認できます。

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::ports::{ObjectError, ObjectFetcher};

#[derive(Default)]
pub struct InMemoryObjectFetcher {
    /// (bucket, name) -> bytes
    objects: RwLock<HashMap<(String, String), Bytes>>,
    calls: AtomicUsize,
    /// Some なら download が常にこのメッセージで失敗する
    fail_downloads: Option<String>,
}

impl InMemoryObjectFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// download を常に失敗させる（transport 障害の再現用）
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_downloads: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn put(&self, bucket: &str, name: &str, bytes: impl Into<Bytes>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), name.to_string()), bytes.into());
    }

    /// exists / download の合計呼び出し回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectFetcher for InMemoryObjectFetcher {
    async fn exists(&self, bucket: &str, name: &str) -> Result<bool, ObjectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.read().await;
        Ok(objects.contains_key(&(bucket.to_string(), name.to_string())))
    }

    async fn download(&self, bucket: &str, name: &str) -> Result<Bytes, ObjectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_downloads {
            return Err(ObjectError::Fetch(message.clone()));
        }
        let objects = self.objects.read().await;
        objects
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ObjectError::NotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            })
    }
}
