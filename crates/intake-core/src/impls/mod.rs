//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **CsvTableParser**: `csv` クレートによる TabularParser
//! - **InMemoryObjectFetcher / InMemoryDocumentStore**: テスト・ローカル用
//! - **ObjectStoreFetcher**: GCS またはローカルディレクトリ（`object_store` クレート）
//! - **FsDocumentStore**: ディレクトリに JSON ドキュメントを保存

pub mod csv_parser;
pub mod fs_documents;
pub mod inmem_documents;
pub mod inmem_objects;
pub mod object_store_fetcher;

pub use self::csv_parser::CsvTableParser;
pub use self::fs_documents::FsDocumentStore;
pub use self::inmem_documents::InMemoryDocumentStore;
pub use self::inmem_objects::InMemoryObjectFetcher;
pub use self::object_store_fetcher::{BucketBackend, ObjectStoreFetcher};
