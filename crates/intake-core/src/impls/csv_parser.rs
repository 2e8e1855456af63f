//! CsvTableParser - `csv` クレートによる TabularParser 実装
//!
//! - 1 行目はヘッダー。ヘッダーが無い（空のオブジェクト）ならエラー
//! - ヘッダーより短い行は欠損セル扱いで数える。長い行はエラー
//! - UTF-8 でない内容はエラー
//! - セルの型変換はしない

use csv::ReaderBuilder;

use crate::domain::TableSummary;
use crate::ports::{TableError, TabularParser};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableParser;

impl CsvTableParser {
    pub fn new() -> Self {
        Self
    }
}

impl TabularParser for CsvTableParser {
    fn parse(&self, bytes: &[u8]) -> Result<TableSummary, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            return Err(TableError::Malformed("no columns to parse from file".to_string()));
        }

        let mut row_count = 0u64;
        for record in reader.records() {
            let record = record.map_err(malformed)?;
            if record.len() > columns.len() {
                return Err(TableError::Malformed(format!(
                    "record {} has {} fields, header has {}",
                    row_count + 1,
                    record.len(),
                    columns.len()
                )));
            }
            row_count += 1;
        }

        Ok(TableSummary::new(row_count, columns))
    }
}

fn malformed(err: csv::Error) -> TableError {
    TableError::Malformed(err.to_string())
}
