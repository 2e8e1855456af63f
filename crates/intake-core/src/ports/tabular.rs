//! TabularParser port - 区切り文字付きテキストの読み取り

use thiserror::Error;

use crate::domain::TableSummary;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("{0}")]
    Malformed(String),
}

/// TabularParser はヘッダー行付きの表データから行数と列名を返す
///
/// 純粋関数なので同期 trait です（I/O なし）。
pub trait TabularParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<TableSummary, TableError>;
}
