//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」です。外部サービス（オブジェクトストレージ、
//! ドキュメントストア）と CSV パーサを trait で隠し、ハンドラには
//! 起動時に組み立てた実装を注入します。テストでは InMemory 実装に差し替えます。

pub mod clock;
pub mod document_store;
pub mod id_generator;
pub mod object_fetcher;
pub mod tabular;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::document_store::{DocumentStore, StoreError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::object_fetcher::{ObjectError, ObjectFetcher};
pub use self::tabular::{TableError, TabularParser};
