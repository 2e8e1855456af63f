//! App - アプリケーション層
//!
//! ports を組み合わせて 1 回の呼び出しを処理します。
//!
//! # 主要コンポーネント
//! - **IdempotencyGate**: Processing Record の確認と記録
//! - **IntakeHandler**: normalize → CSV 判定 → gate → fetch → parse → record
//! - **AppBuilder**: 依存の注入と起動時検証
//! - **http**: axum の Router（push エンドポイントと healthz）

pub mod builder;
pub mod gate;
pub mod handler;
pub mod http;

pub use self::builder::{AppBuilder, BuildError};
pub use self::gate::IdempotencyGate;
pub use self::handler::IntakeHandler;
pub use self::http::router;
