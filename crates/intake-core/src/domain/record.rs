//! ProcessingRecord - 処理済みマーカー
//!
//! オブジェクト名をキーにしたドキュメントです。存在すること自体が
//! 「処理済み」を意味し、このシステムが更新・削除することはありません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::TableSummary;

/// ドキュメントストアに保存されるフィールド
///
/// `processed_at` はドキュメントストア側の時計で書き込み時に付与されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub bucket: String,
    pub filename: String,
    pub processed_at: DateTime<Utc>,
    pub rows_processed: u64,
    pub columns_found: Vec<String>,
}

/// 書き込み前のフィールド（`processed_at` なし）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub bucket: String,
    pub filename: String,
    pub rows_processed: u64,
    pub columns_found: Vec<String>,
}

impl RecordFields {
    pub fn new(bucket: &str, filename: &str, summary: &TableSummary) -> Self {
        Self {
            bucket: bucket.to_string(),
            filename: filename.to_string(),
            rows_processed: summary.row_count,
            columns_found: summary.columns.clone(),
        }
    }

    /// サーバー時刻を付与して ProcessingRecord にする
    pub fn stamp(self, processed_at: DateTime<Utc>) -> ProcessingRecord {
        ProcessingRecord {
            bucket: self.bucket,
            filename: self.filename,
            processed_at,
            rows_processed: self.rows_processed,
            columns_found: self.columns_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamp_keeps_fields_and_sets_timestamp() {
        let summary = TableSummary::new(2, vec!["a".to_string(), "b".to_string()]);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let record = RecordFields::new("bkt", "data.csv", &summary).stamp(at);

        assert_eq!(record.bucket, "bkt");
        assert_eq!(record.filename, "data.csv");
        assert_eq!(record.processed_at, at);
        assert_eq!(record.rows_processed, 2);
        assert_eq!(record.columns_found, vec!["a", "b"]);
    }

    #[test]
    fn record_serializes_with_document_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = RecordFields::new("bkt", "data.csv", &TableSummary::default()).stamp(at);

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["filename"], "data.csv");
        assert_eq!(v["rows_processed"], 0);
        assert_eq!(v["processed_at"], "2024-01-01T00:00:00Z");
        assert!(v["columns_found"].as_array().unwrap().is_empty());
    }
}
