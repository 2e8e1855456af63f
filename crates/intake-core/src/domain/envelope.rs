//! Envelope - push 通知の正規化
//!
//! 受け付ける形は 2 種類です。
//!
//! ```text
//! { "message": { "data": "<base64>" } }           // pubsub push
//! { "data": { "bucket": "...", "name": "..." } }   // 直接 payload（data は JSON 文字列でも可）
//! ```
//!
//! どちらも最終的に [`StorageEvent`] に変換されます。副作用はありません。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use super::errors::EnvelopeError;
use super::event::StorageEvent;

/// リクエストボディを [`StorageEvent`] に正規化する
///
/// # 手順
/// 1. ボディを JSON object として読む（失敗 → `InvalidPayload`）
/// 2. `message` があれば `message.data` を base64 → JSON
/// 3. なければ `data` を object またはJSON文字列として読む
/// 4. どちらもなければ `UnrecognizedEnvelope`
/// 5. `bucket` / `name` を取り出す（空 → `MissingFields`）
pub fn normalize(body: &[u8]) -> Result<StorageEvent, EnvelopeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(EnvelopeError::InvalidPayload("empty request body".to_string()));
    }

    let envelope: Value =
        serde_json::from_slice(body).map_err(|e| EnvelopeError::InvalidPayload(e.to_string()))?;
    let Value::Object(envelope) = envelope else {
        return Err(EnvelopeError::InvalidPayload(
            "request body must be a JSON object".to_string(),
        ));
    };

    let candidate = if let Some(message) = envelope.get("message") {
        unwrap_pubsub(message)?
    } else if let Some(data) = envelope.get("data") {
        unwrap_direct(data)?
    } else {
        return Err(EnvelopeError::UnrecognizedEnvelope);
    };

    extract_event(&candidate)
}

fn unwrap_pubsub(message: &Value) -> Result<Value, EnvelopeError> {
    let data = message
        .get("data")
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingData)?;

    let decoded = STANDARD.decode(data.trim())?;
    let text = String::from_utf8(decoded)
        .map_err(|e| EnvelopeError::ParseError(format!("message data is not UTF-8: {e}")))?;

    serde_json::from_str(text.trim()).map_err(|e| EnvelopeError::ParseError(e.to_string()))
}

fn unwrap_direct(data: &Value) -> Result<Value, EnvelopeError> {
    match data {
        Value::Object(_) => Ok(data.clone()),
        Value::String(text) => {
            serde_json::from_str(text).map_err(|e| EnvelopeError::ParseError(e.to_string()))
        }
        other => Err(EnvelopeError::ParseError(format!(
            "`data` must be an object or a JSON string, got {}",
            json_type(other)
        ))),
    }
}

fn extract_event(candidate: &Value) -> Result<StorageEvent, EnvelopeError> {
    let Value::Object(fields) = candidate else {
        return Err(EnvelopeError::ParseError(format!(
            "storage event must be a JSON object, got {}",
            json_type(candidate)
        )));
    };

    let bucket = required_str(fields, "bucket")?;
    let name = required_str(fields, "name")?;
    Ok(StorageEvent::new(bucket, name))
}

fn required_str<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, EnvelopeError> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(EnvelopeError::MissingFields(key))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
