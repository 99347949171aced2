//! Shared fixtures: a scripted in-memory transport and session helpers.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use apiquery::api::{
    ApiClient, Credentials, MemorySession, RefreshMode, Transport, TransportError,
    TransportRequest, TransportResponse,
};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};

pub const BASE: &str = "/api";
pub const REFRESH_URL: &str = "/api/auth/refresh-token";

type Handler =
    dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    delay: Option<Duration>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Suspend every send so concurrent calls interleave.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_to(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

pub fn auth_header(request: &TransportRequest) -> Option<String> {
    request
        .config
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn ok(body: Value) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse::new(200, Some(body)))
}

pub fn fail(status: u16, body: Option<Value>) -> Result<TransportResponse, TransportError> {
    Err(TransportError::status(TransportResponse::new(status, body)))
}

pub fn refresh_success(token: &str) -> Result<TransportResponse, TransportError> {
    ok(json!({"Data": {"JwtToken": token, "Expiry": "2099-01-01"}}))
}

pub fn signed_in(access: &str) -> Arc<MemorySession> {
    Arc::new(MemorySession::new(Credentials::new(access, "refresh-1")))
}

pub fn client(
    session: &Arc<MemorySession>,
    transport: &Arc<ScriptedTransport>,
    mode: RefreshMode,
) -> ApiClient {
    ApiClient::builder(BASE, session.clone().into_context())
        .shared_transport(transport.clone())
        .refresh_mode(mode)
        .build()
}

/// Server that accepts only `Bearer <valid>` and refreshes to `valid`.
pub fn token_server(valid: &'static str, body: Value) -> ScriptedTransport {
    ScriptedTransport::new(move |request| {
        if request.url == REFRESH_URL {
            return refresh_success(valid);
        }
        match auth_header(request) {
            Some(header) if header == format!("Bearer {valid}") => ok(body.clone()),
            _ => fail(401, Some(json!({"message": "token expired"}))),
        }
    })
}
