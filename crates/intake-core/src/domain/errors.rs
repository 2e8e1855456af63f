//! Errors - エラー型と分類
//!
//! 2 層に分かれています。
//! - [`EnvelopeError`]: 通知 envelope の正規化失敗（すべて 400）
//! - [`IntakeError`]: 1 回の呼び出し全体のエラー（HTTP ステータスを持つ）
//!
//! どのエラーも呼び出し内ではリトライしません。5xx を返せば配送側が再配送します。

use thiserror::Error;

use crate::ports::{ObjectError, StoreError, TableError};

/// EnvelopeError は envelope 正規化の失敗理由
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("missing `data` field in pubsub message")]
    MissingData,

    #[error("failed to decode base64 message data: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("failed to parse event payload as JSON: {0}")]
    ParseError(String),

    #[error("Invalid message format, missing required fields")]
    UnrecognizedEnvelope,

    #[error("storage event is missing required field `{0}`")]
    MissingFields(&'static str),
}

/// IntakeError は 1 回の呼び出しを終了させるエラー
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("object gs://{bucket}/{name} not found")]
    NotFound { bucket: String, name: String },

    #[error("failed to fetch object: {0}")]
    Fetch(String),

    #[error("failed to parse CSV: {0}")]
    Parse(String),

    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),
}

impl IntakeError {
    /// HTTP ステータスコード（axum に依存しないよう u16 で返す）
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Envelope(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Fetch(_) | Self::Parse(_) | Self::StoreUnavailable(_) => 500,
        }
    }
}

impl From<ObjectError> for IntakeError {
    fn from(err: ObjectError) -> Self {
        match err {
            ObjectError::NotFound { bucket, name } => Self::NotFound { bucket, name },
            ObjectError::Fetch(msg) => Self::Fetch(msg),
        }
    }
}

impl From<StoreError> for IntakeError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<TableError> for IntakeError {
    fn from(err: TableError) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::envelope(IntakeError::Envelope(EnvelopeError::MissingData), 400)]
    #[case::not_found(IntakeError::NotFound { bucket: "b".into(), name: "f.csv".into() }, 404)]
    #[case::fetch(IntakeError::Fetch("boom".into()), 500)]
    #[case::parse(IntakeError::Parse("bad quote".into()), 500)]
    #[case::store(IntakeError::StoreUnavailable("down".into()), 500)]
    fn status_code_follows_error_kind(#[case] err: IntakeError, #[case] expected: u16) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn object_not_found_keeps_location() {
        let err: IntakeError = ObjectError::NotFound {
            bucket: "bkt".to_string(),
            name: "data.csv".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "object gs://bkt/data.csv not found");
    }

    #[test]
    fn envelope_error_is_transparent() {
        let err: IntakeError = EnvelopeError::MissingFields("bucket").into();
        assert_eq!(
            err.to_string(),
            "storage event is missing required field `bucket`"
        );
    }
}
