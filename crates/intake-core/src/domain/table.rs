use serde::{Deserialize, Serialize};

/// Result of reading a CSV payload: data row count and header names in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub row_count: u64,
    pub columns: Vec<String>,
}

impl TableSummary {
    pub fn new(row_count: u64, columns: Vec<String>) -> Self {
        Self { row_count, columns }
    }
}
