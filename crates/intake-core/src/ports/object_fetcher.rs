//! ObjectFetcher port - オブジェクトストレージからの取得
//!
//! # 実装
//! - **InMemoryObjectFetcher**: テスト・ローカル用
//! - **ObjectStoreFetcher**: `object_store` クレート経由（GCS / ローカルディレクトリ）

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("object {bucket}/{name} not found")]
    NotFound { bucket: String, name: String },

    #[error("{0}")]
    Fetch(String),
}

/// ObjectFetcher はオブジェクトの存在確認と全体ダウンロードを提供
///
/// # 設計原則
/// - `download` はストリーミングせず全体をメモリに載せる
/// - 存在しないオブジェクトは `Fetch` ではなく `NotFound` で返す
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    async fn exists(&self, bucket: &str, name: &str) -> Result<bool, ObjectError>;

    async fn download(&self, bucket: &str, name: &str) -> Result<Bytes, ObjectError>;
}
