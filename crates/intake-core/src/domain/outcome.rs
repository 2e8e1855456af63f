//! Outcome model: 成功側の結果。
//!
//! スキップ（CSV でない / 処理済み）はエラーではなく成功扱いの no-op です。
//! 失敗側は [`super::IntakeError`] が表します。

use serde::{Deserialize, Serialize};

use super::table::TableSummary;

pub const CSV_READ_SUCCESSFUL: &str = "CSV read successful";

/// 1 回の呼び出しが正常終了したときの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeOutcome {
    /// ダウンロード・パース・記録まで完了
    Processed { name: String, summary: TableSummary },

    /// `.csv` 以外なので何もしなかった
    SkippedNotCsv { name: String },

    /// Processing Record が既にある
    AlreadyProcessed { name: String },
}

impl IntakeOutcome {
    /// レスポンスの `message` に入れる文言
    pub fn message(&self) -> String {
        match self {
            Self::Processed { .. } => CSV_READ_SUCCESSFUL.to_string(),
            Self::SkippedNotCsv { name } => format!("{name} is not a CSV file. Skipping."),
            Self::AlreadyProcessed { name } => format!("{name} already processed. Skipping."),
        }
    }

    pub fn is_skip(&self) -> bool {
        !matches!(self, Self::Processed { .. })
    }
}
