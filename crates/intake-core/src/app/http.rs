//! HTTP surface - push 通知を受ける axum Router
//!
//! - `POST /`: 通知ボディを [`IntakeHandler`] に渡し、結果を JSON にする
//! - `GET /healthz`: liveness
//!
//! レスポンスは 2xx なら `{"message": ...}`、4xx/5xx なら `{"error": ...}`。
//! ハンドラ内の panic も CatchPanicLayer で 500 の JSON に変換します。

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::domain::{IntakeError, IntakeOutcome};

use super::handler::IntakeHandler;

#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<IntakeOutcome> for MessageBody {
    fn from(outcome: IntakeOutcome) -> Self {
        let message = outcome.message();
        match outcome {
            IntakeOutcome::Processed { summary, .. } => Self {
                message,
                rows: Some(summary.row_count),
                columns: Some(summary.columns),
            },
            IntakeOutcome::SkippedNotCsv { .. } | IntakeOutcome::AlreadyProcessed { .. } => Self {
                message,
                rows: None,
                columns: None,
            },
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error_response(status, self.to_string())
    }
}

pub fn router(handler: Arc<IntakeHandler>) -> Router {
    Router::new()
        .route("/", post(receive))
        .route("/healthz", get(healthz))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn receive(
    State(handler): State<Arc<IntakeHandler>>,
    body: Bytes,
) -> Result<Json<MessageBody>, IntakeError> {
    let outcome = handler.handle(&body).await?;
    Ok(Json(outcome.into()))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableSummary;

    #[test]
    fn processed_body_has_rows_and_columns() {
        let body: MessageBody = IntakeOutcome::Processed {
            name: "data.csv".to_string(),
            summary: TableSummary::new(1, vec!["x".to_string(), "y".to_string()]),
        }
        .into();

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"message":"CSV read successful","rows":1,"columns":["x","y"]})
        );
    }

    #[test]
    fn skip_body_has_only_message() {
        let body: MessageBody = IntakeOutcome::AlreadyProcessed {
            name: "data.csv".to_string(),
        }
        .into();

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"message":"data.csv already processed. Skipping."})
        );
    }

    #[test]
    fn error_maps_to_status() {
        let response = IntakeError::NotFound {
            bucket: "b".to_string(),
            name: "f.csv".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn panic_payload_becomes_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
