use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a key field with surrounding whitespace removed, so ids and
/// addresses compare the same on every endpoint.
pub fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(match raw.trim() {
        t if t.len() == raw.len() => raw,
        t => t.to_string(),
    })
}

/// Outcome marker carried by every response envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum StatusMessage {
    Success,
    Failed,
}

/// Success envelope: `{"StatusMessage": "Success", ...payload}`.
///
/// The payload's fields are flattened into the envelope, so `T` must
/// serialize as a JSON object (use [`Empty`] for no payload).
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "StatusMessage")]
    pub status_message: StatusMessage,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(payload: T) -> Self {
        Self {
            status_message: StatusMessage::Success,
            payload,
        }
    }
}

impl Envelope<Empty> {
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Payload for operations that return nothing but the status.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Empty {}

/// Envelope with no payload, for OpenAPI docs.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    /// Always `Success`.
    #[serde(rename = "StatusMessage")]
    pub status_message: StatusMessage,
}
