//! Result normalization
//!
//! Every pipeline outcome ends up as `Ok(payload)` or `Err(ApiError)`; nothing
//! panics or escapes past the client.

use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::constants::{FORBIDDEN_CODES, UNAUTHORIZED_CODES, UNKNOWN_ERROR_MESSAGE};
use super::transport::{TransportError, TransportResponse};

/// What went wrong, as far as a caller needs to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiErrorKind {
    /// No response was received.
    Network,
    /// 401 that the refresh protocol could not recover from.
    AuthExpired,
    /// 403.
    Forbidden,
    /// Any other non-2xx response.
    Remote,
    /// The request failed local validation and was never sent.
    InvalidRequest,
    /// Anything not recognized as a transport failure.
    Unknown,
}

/// Normalized failure. Serializes like the remote client's error object:
/// `{"kind", "errorMessage", "responseStatus", "body"?}`.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    #[serde(rename = "errorMessage")]
    pub message: String,
    /// HTTP status, `0` when no response was received.
    #[serde(rename = "responseStatus")]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Classify a transport failure by its status alone.
pub fn classify(err: &TransportError) -> ApiErrorKind {
    match err.status_code() {
        None => ApiErrorKind::Network,
        Some(status) if UNAUTHORIZED_CODES.contains(&status) => ApiErrorKind::AuthExpired,
        Some(status) if FORBIDDEN_CODES.contains(&status) => ApiErrorKind::Forbidden,
        Some(_) => ApiErrorKind::Remote,
    }
}

/// Pull a human-readable message out of an error body.
fn body_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => ["message", "Message", "errorMessage", "title", "error"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
                _ => None,
            }),
        _ => None,
    }
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>, status: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
            body: None,
        }
    }

    /// Build from a transport failure, preferring the message the remote
    /// body carries.
    pub fn from_transport(kind: ApiErrorKind, err: &TransportError) -> Self {
        let body = err.response.as_ref().and_then(|r| r.body.clone());
        let message = body
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| err.message.clone());

        Self {
            kind,
            message,
            status: err.status_code().unwrap_or(0),
            body,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message, 0)
    }

    pub fn unknown() -> Self {
        Self::new(ApiErrorKind::Unknown, UNKNOWN_ERROR_MESSAGE, 0)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message, 0)
    }

    pub fn is_auth_expired(&self) -> bool {
        self.kind == ApiErrorKind::AuthExpired
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::from_transport(classify(&err), &err)
    }
}

/// Decode a settled outcome into the caller's payload type.
///
/// An absent or `null` body is `Ok(None)`. A body that does not decode into
/// `R` becomes [`ApiErrorKind::Unknown`].
pub fn normalize<R: DeserializeOwned>(
    outcome: Result<TransportResponse, ApiError>,
) -> ApiResult<Option<R>> {
    let response = outcome?;
    match response.body {
        None | Some(Value::Null) => Ok(None),
        Some(body) => serde_json::from_value(body).map(Some).map_err(|e| {
            error!("Failed to decode response body (status {}): {}", response.status, e);
            ApiError::unknown()
        }),
    }
}
