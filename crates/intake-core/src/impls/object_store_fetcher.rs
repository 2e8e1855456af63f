//! ObjectStoreFetcher - `object_store` クレートによる ObjectFetcher 実装
//!
//! # バックエンド
//! - **Gcs**: バケットごとに `GoogleCloudStorage` クライアントを 1 つ作り、プロセス内で再利用
//!   （認証情報は `GoogleCloudStorageBuilder::from_env` が読む標準の環境変数）
//! - **Local**: `root/<bucket>/<name>` を読む。ローカル開発用

use async_trait::async_trait;
use bytes::Bytes;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{ObjectStore, RetryConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::ports::{ObjectError, ObjectFetcher};

/// どこからオブジェクトを読むか
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketBackend {
    Gcs,
    Local { root: PathBuf },
}

pub struct ObjectStoreFetcher {
    backend: BucketBackend,
    /// bucket -> client。Local では "" キーに 1 つだけ入る
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreFetcher {
    pub fn new(backend: BucketBackend) -> Self {
        Self {
            backend,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// 特定バケットのクライアントを差し込む（テストやエミュレータ向け）
    pub fn with_store(self, bucket: &str, store: Arc<dyn ObjectStore>) -> Self {
        if let Ok(mut stores) = self.stores.lock() {
            stores.insert(self.store_key(bucket).to_string(), store);
        }
        self
    }

    fn store_key<'a>(&self, bucket: &'a str) -> &'a str {
        match self.backend {
            BucketBackend::Gcs => bucket,
            BucketBackend::Local { .. } => "",
        }
    }

    /// バケットに対応するクライアントとオブジェクトパスを返す
    fn resolve(
        &self,
        bucket: &str,
        name: &str,
    ) -> Result<(Arc<dyn ObjectStore>, Path), ObjectError> {
        let key = self.store_key(bucket);
        let mut stores = self
            .stores
            .lock()
            .map_err(|_| ObjectError::Fetch("object store registry poisoned".to_string()))?;

        let store = match stores.get(key) {
            Some(store) => Arc::clone(store),
            None => {
                let store = self.build_store(bucket)?;
                stores.insert(key.to_string(), Arc::clone(&store));
                store
            }
        };

        let location = match self.backend {
            BucketBackend::Gcs => name.to_string(),
            BucketBackend::Local { .. } => format!("{bucket}/{name}"),
        };
        // 再配送しても結果は変わらない
        let path = Path::parse(&location).map_err(|e| {
            warn!(bucket, name, error = %e, "object name cannot be addressed");
            ObjectError::Fetch(format!("invalid object name `{name}`: {e}"))
        })?;

        Ok((store, path))
    }

    fn build_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, ObjectError> {
        match &self.backend {
            BucketBackend::Gcs => {
                debug!(bucket, "building GCS client");
                let store = GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .with_retry(RetryConfig::default())
                    .build()
                    .map_err(|e| ObjectError::Fetch(e.to_string()))?;
                Ok(Arc::new(store))
            }
            BucketBackend::Local { root } => {
                debug!(root = %root.display(), "building local object store");
                let store = LocalFileSystem::new_with_prefix(root)
                    .map_err(|e| ObjectError::Fetch(e.to_string()))?;
                Ok(Arc::new(store))
            }
        }
    }
}

fn map_error(bucket: &str, name: &str, err: object_store::Error) -> ObjectError {
    match err {
        object_store::Error::NotFound { .. } => ObjectError::NotFound {
            bucket: bucket.to_string(),
            name: name.to_string(),
        },
        other => ObjectError::Fetch(other.to_string()),
    }
}

#[async_trait]
impl ObjectFetcher for ObjectStoreFetcher {
    async fn exists(&self, bucket: &str, name: &str) -> Result<bool, ObjectError> {
        let (store, path) = self.resolve(bucket, name)?;
        match store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(ObjectError::Fetch(e.to_string())),
        }
    }

    async fn download(&self, bucket: &str, name: &str) -> Result<Bytes, ObjectError> {
        let (store, path) = self.resolve(bucket, name)?;
        let result = store
            .get(&path)
            .await
            .map_err(|e| map_error(bucket, name, e))?;
        result.bytes().await.map_err(|e| map_error(bucket, name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::PutPayload;
    use object_store::memory::InMemory;
    use rstest::rstest;

    async fn memory_store(name: &str, body: &'static [u8]) -> Arc<dyn ObjectStore> {
        let store = InMemory::new();
        store
            .put(&Path::from(name), PutPayload::from(Bytes::from_static(body)))
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn injected_store_serves_its_bucket() {
        let fetcher = ObjectStoreFetcher::new(BucketBackend::Gcs)
            .with_store("bkt", memory_store("dir/data.csv", b"x,y\n1,2\n").await);

        assert!(fetcher.exists("bkt", "dir/data.csv").await.unwrap());
        assert!(!fetcher.exists("bkt", "other.csv").await.unwrap());

        let bytes = fetcher.download("bkt", "dir/data.csv").await.unwrap();
        assert_eq!(&bytes[..], b"x,y\n1,2\n");
    }

    #[tokio::test]
    async fn missing_object_download_is_not_found() {
        let fetcher = ObjectStoreFetcher::new(BucketBackend::Gcs)
            .with_store("bkt", Arc::new(InMemory::new()));

        let err = fetcher.download("bkt", "gone.csv").await.unwrap_err();
        assert!(matches!(
            err,
            ObjectError::NotFound { bucket, name } if bucket == "bkt" && name == "gone.csv"
        ));
    }

    #[tokio::test]
    async fn local_backend_reads_bucket_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("bkt/in")).unwrap();
        std::fs::write(tmp.path().join("bkt/in/data.csv"), b"a,b\n1,2\n").unwrap();

        let fetcher = ObjectStoreFetcher::new(BucketBackend::Local {
            root: tmp.path().to_path_buf(),
        });

        assert!(fetcher.exists("bkt", "in/data.csv").await.unwrap());
        assert!(!fetcher.exists("other", "in/data.csv").await.unwrap());
        assert_eq!(
            &fetcher.download("bkt", "in/data.csv").await.unwrap()[..],
            b"a,b\n1,2\n"
        );
    }

    #[rstest]
    #[case::parent_segment("a/../b.csv")]
    #[case::empty_segment("a//b.csv")]
    #[case::dot_segment("./x.csv")]
    #[tokio::test]
    async fn unaddressable_name_is_fetch_error_naming_the_object(#[case] name: &str) {
        let fetcher = ObjectStoreFetcher::new(BucketBackend::Gcs)
            .with_store("bkt", Arc::new(InMemory::new()));

        let err = fetcher.exists("bkt", name).await.unwrap_err();
        assert!(matches!(&err, ObjectError::Fetch(msg) if msg.contains(name)));
    }
}
