//! IntakeHandler - 1 回の通知を最後まで処理する
//!
//! # 状態遷移
//! ```text
//! received → normalized → name-checked (not-csv | already-processed | proceed)
//!          → existence-checked → fetched → parsed → recorded
//! ```
//! 最初の失敗で終了します。ロールバックはありません。記録の書き込みに失敗した
//! オブジェクトは未記録のまま残り、再配送で再処理されます。

use std::sync::Arc;
use tracing::field::Empty;
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::domain::{IntakeError, IntakeOutcome, StorageEvent, normalize};
use crate::ports::{IdGenerator, ObjectFetcher, TabularParser};

use super::gate::IdempotencyGate;

pub struct IntakeHandler {
    objects: Arc<dyn ObjectFetcher>,
    gate: IdempotencyGate,
    parser: Arc<dyn TabularParser>,
    ids: Arc<dyn IdGenerator>,
}

impl IntakeHandler {
    pub fn new(
        objects: Arc<dyn ObjectFetcher>,
        gate: IdempotencyGate,
        parser: Arc<dyn TabularParser>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            objects,
            gate,
            parser,
            ids,
        }
    }

    /// リクエストボディ（生バイト列）を処理する
    pub async fn handle(&self, body: &[u8]) -> Result<IntakeOutcome, IntakeError> {
        let invocation_id = self.ids.generate_invocation_id();
        let span = info_span!(
            "intake",
            invocation_id = %invocation_id,
            bucket = Empty,
            name = Empty,
        );

        let result = self.process(body).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(outcome) => info!(
                outcome = %outcome.message(),
                skipped = outcome.is_skip(),
                "invocation finished"
            ),
            Err(err) if err.status_code() < 500 => warn!(error = %err, "invocation rejected"),
            Err(err) => error!(error = %err, "invocation failed"),
        });
        result
    }

    async fn process(&self, body: &[u8]) -> Result<IntakeOutcome, IntakeError> {
        let event = normalize(body)?;
        let span = Span::current();
        span.record("bucket", event.bucket.as_str());
        span.record("name", event.name.as_str());

        if !event.is_csv() {
            return Ok(IntakeOutcome::SkippedNotCsv { name: event.name });
        }

        if self.gate.has_processed(&event.name).await? {
            return Ok(IntakeOutcome::AlreadyProcessed { name: event.name });
        }

        info!(uri = %event, "processing file");
        let summary = {
            let bytes = self.fetch(&event).await?;
            self.parser.parse(&bytes)?
        };

        self.gate.record(&event, &summary).await?;
        Ok(IntakeOutcome::Processed {
            name: event.name,
            summary,
        })
    }

    async fn fetch(&self, event: &StorageEvent) -> Result<bytes::Bytes, IntakeError> {
        if !self.objects.exists(&event.bucket, &event.name).await? {
            return Err(IntakeError::NotFound {
                bucket: event.bucket.clone(),
                name: event.name.clone(),
            });
        }
        Ok(self.objects.download(&event.bucket, &event.name).await?)
    }
}
