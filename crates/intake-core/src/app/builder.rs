//! AppBuilder - 依存の組み立てとワイヤリング
//!
//! バックエンドのクライアントはプロセス起動時に 1 度だけ作り、ここで注入します。
//! リクエストごとに作り直すことはありません。
//!
//! # Fail-fast 設計
//! - ObjectFetcher と DocumentStore は必須（既定値なし）
//! - 不足があれば build() が BuildError を返す
//! - TabularParser / IdGenerator は未指定なら CsvTableParser / UlidGenerator<SystemClock>

use std::sync::Arc;

use crate::impls::CsvTableParser;
use crate::ports::{
    DocumentStore, IdGenerator, ObjectFetcher, SystemClock, TabularParser, UlidGenerator,
};

use super::gate::IdempotencyGate;
use super::handler::IntakeHandler;

/// # 使用例
/// ```ignore
/// let handler = AppBuilder::new()
///     .object_fetcher(Arc::new(ObjectStoreFetcher::new(BucketBackend::Gcs)))
///     .document_store(Arc::new(FsDocumentStore::new("./data", "processed_files")))
///     .build()?;
/// ```
#[derive(Default)]
pub struct AppBuilder {
    objects: Option<Arc<dyn ObjectFetcher>>,
    documents: Option<Arc<dyn DocumentStore>>,
    parser: Option<Arc<dyn TabularParser>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be provided before build().")]
    MissingComponents(Vec<&'static str>),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_fetcher(mut self, objects: Arc<dyn ObjectFetcher>) -> Self {
        self.objects = Some(objects);
        self
    }

    pub fn document_store(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn tabular_parser(mut self, parser: Arc<dyn TabularParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<IntakeHandler, BuildError> {
        let (Some(objects), Some(documents)) = (self.objects.clone(), self.documents.clone())
        else {
            let mut missing = Vec::new();
            if self.objects.is_none() {
                missing.push("object_fetcher");
            }
            if self.documents.is_none() {
                missing.push("document_store");
            }
            return Err(BuildError::MissingComponents(missing));
        };

        let parser: Arc<dyn TabularParser> = match self.parser {
            Some(parser) => parser,
            None => Arc::new(CsvTableParser::new()),
        };
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(SystemClock)),
        };

        Ok(IntakeHandler::new(
            objects,
            IdempotencyGate::new(documents),
            parser,
            ids,
        ))
    }
}
