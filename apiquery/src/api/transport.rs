//! HTTP transport seam
//!
//! The pipeline only sees [`Transport`]; [`HttpTransport`] is the `reqwest`
//! implementation, tests substitute scripted ones.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

use super::config::RequestConfig;

/// One fully-resolved request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub config: RequestConfig,
    pub body: Option<Value>,
}

/// A response the remote end produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Decoded body; `None` when empty, a JSON string when not valid JSON.
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A failed dispatch. `response` is present only when the remote end
/// answered with a non-2xx status.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<TransportResponse>,
}

impl TransportError {
    /// No response was received.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// The remote end answered with a non-2xx status.
    pub fn status(response: TransportResponse) -> Self {
        Self {
            message: format!("Request failed with status code {}", response.status),
            response: Some(response),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Transport whose requests time out after `timeout` unless a call sets
    /// its own.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            config,
            body,
        } = request;

        let mut builder = self.client.request(method, &url).headers(config.headers);
        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;

        let response = TransportResponse::new(status, decode_body(&text));
        if response.is_success() {
            Ok(response)
        } else {
            Err(TransportError::status(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), None);
        assert_eq!(decode_body("  \n"), None);
        assert_eq!(decode_body(r#"{"a":1}"#), Some(json!({"a": 1})));
        assert_eq!(decode_body("plain text"), Some(json!("plain text")));
    }

    #[test]
    fn test_status_error_message() {
        let err = TransportError::status(TransportResponse::new(500, None));
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(TransportError::network("refused").status_code(), None);
    }
}
