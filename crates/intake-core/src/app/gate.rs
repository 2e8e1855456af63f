//! IdempotencyGate - 処理済みかどうかの確認と記録
//!
//! # 保証
//! read → 条件付き write なので at-least-once です。
//! 同じオブジェクト名の通知が同時に 2 つ来ると、両方が `has_processed == false`
//! を見てから記録する可能性があります（どちらも処理される）。
//! exactly-once が必要になったら DocumentStore に create-if-absent を足す必要があります。
//!
//! キーはオブジェクト名だけです。同じ名前で中身が変わっても重複扱いになります。

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{IntakeError, ProcessingRecord, RecordFields, StorageEvent, TableSummary};
use crate::ports::DocumentStore;

#[derive(Clone)]
pub struct IdempotencyGate {
    store: Arc<dyn DocumentStore>,
}

impl IdempotencyGate {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn has_processed(&self, name: &str) -> Result<bool, IntakeError> {
        let existing = self.store.get(name).await?;
        debug!(found = existing.is_some(), "checked processing record");
        Ok(existing.is_some())
    }

    #[instrument(skip(self, event, summary), fields(bucket = %event.bucket, name = %event.name))]
    pub async fn record(
        &self,
        event: &StorageEvent,
        summary: &TableSummary,
    ) -> Result<ProcessingRecord, IntakeError> {
        let fields = RecordFields::new(&event.bucket, &event.name, summary);
        let record = self.store.set(&event.name, fields).await?;
        debug!(processed_at = %record.processed_at, "processing record written");
        Ok(record)
    }
}
