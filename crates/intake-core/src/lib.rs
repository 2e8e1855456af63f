//! intake-core
//!
//! Core building blocks for the CSV intake handler.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, envelope, event, record, table, outcome, errors）
//! - **ports**: 抽象化レイヤー（ObjectFetcher, DocumentStore, TabularParser, Clock, IdGenerator）
//! - **impls**: ports の実装（InMemory 系はテスト・ローカル用、object_store / fs は本番用）
//! - **app**: アプリケーションロジック（IdempotencyGate, IntakeHandler, AppBuilder, HTTP router）

pub mod domain;
pub mod ports;
pub mod impls;
pub mod app;
