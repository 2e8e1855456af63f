//! DocumentStore port - Processing Record の保存先
//!
//! ストアは 1 つのコレクション（既定 `processed_files`）に紐づき、
//! ドキュメントのキーはオブジェクト名です。
//!
//! # 実装
//! - **InMemoryDocumentStore**: テスト・ローカル用
//! - **FsDocumentStore**: 1 ドキュメント = 1 JSON ファイル

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ProcessingRecord, RecordFields};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store backend error: {0}")]
    Backend(String),

    #[error("corrupt document `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
}

/// DocumentStore はキーでドキュメントを読み書きする
///
/// # 設計原則
/// - `set` は create-or-overwrite（マージしない）
/// - `processed_at` はストア側の時計で付与する（呼び出し側は渡さない）
/// - get → set は 1 トランザクションではない（同一キーの同時実行は両方通りうる）
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ProcessingRecord>, StoreError>;

    async fn set(&self, key: &str, fields: RecordFields) -> Result<ProcessingRecord, StoreError>;
}
