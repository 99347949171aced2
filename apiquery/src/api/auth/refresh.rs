//! Refresh-once protocol
//!
//! A 401 moves the coordinator `Idle -> Requesting`, which ends in
//! `Succeeded` (new access credential stored) or `Failed`. The caller replays
//! its request at most once after `Succeeded`.

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use super::session::CredentialProvider;
use crate::api::config::RequestConfig;
use crate::api::constants::REFRESH_SUCCESS_STATUS;
use crate::api::models::{RefreshTokenRequest, RefreshTokenResponse};
use crate::api::query::DateTimeValue;
use crate::api::transport::{Transport, TransportError, TransportRequest};

/// How concurrent 401s share refresh work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Refreshes are serialized; a caller whose credential was already
    /// replaced while it waited reuses the new one.
    #[default]
    Shared,
    /// Every failing call refreshes on its own.
    Independent,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::Shared => f.write_str("shared"),
            RefreshMode::Independent => f.write_str("independent"),
        }
    }
}

impl FromStr for RefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(RefreshMode::Shared),
            "independent" => Ok(RefreshMode::Independent),
            other => Err(format!(
                "unknown refresh mode '{other}' (expected 'shared' or 'independent')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("no refresh credential is stored")]
    MissingCredential,
    #[error("refresh request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("refresh endpoint answered with status {0}")]
    Rejected(u16),
    #[error("refresh response could not be decoded: {0}")]
    Payload(String),
    /// A concurrent refresh already failed and ended the session.
    #[error("session ended by a concurrent refresh")]
    SignedOut,
}

/// How a successful `refresh` call obtained the credential to replay with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This call exchanged the refresh credential.
    Refreshed,
    /// Another call refreshed while this one waited.
    Reused,
}

/// Runs the refresh exchange against the fixed refresh endpoint.
#[derive(Debug)]
pub struct RefreshCoordinator {
    refresh_url: String,
    mode: RefreshMode,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(refresh_url: impl Into<String>, mode: RefreshMode) -> Self {
        Self {
            refresh_url: refresh_url.into(),
            mode,
            gate: Mutex::new(()),
        }
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Obtain a fresh access credential after a request failed with 401.
    ///
    /// `failed_with` is the access credential the failed request carried.
    pub async fn refresh(
        &self,
        transport: &dyn Transport,
        credentials: &dyn CredentialProvider,
        failed_with: Option<&str>,
    ) -> Result<RefreshOutcome, RefreshError> {
        match self.mode {
            RefreshMode::Independent => self.run(transport, credentials).await,
            RefreshMode::Shared => {
                let _guard = self.gate.lock().await;

                let current = credentials.access_credential();
                if current.as_deref() != failed_with {
                    return match current {
                        Some(_) => {
                            debug!("Access credential replaced while waiting; reusing it");
                            Ok(RefreshOutcome::Reused)
                        }
                        None => Err(RefreshError::SignedOut),
                    };
                }
                self.run(transport, credentials).await
            }
        }
    }

    async fn run(
        &self,
        transport: &dyn Transport,
        credentials: &dyn CredentialProvider,
    ) -> Result<RefreshOutcome, RefreshError> {
        transition(RefreshState::Idle, RefreshState::Requesting);

        match self.exchange(transport, credentials).await {
            Ok(()) => {
                transition(RefreshState::Requesting, RefreshState::Succeeded);
                info!("Access credential refreshed");
                Ok(RefreshOutcome::Refreshed)
            }
            Err(e) => {
                transition(RefreshState::Requesting, RefreshState::Failed);
                warn!("Credential refresh failed: {}", e);
                Err(e)
            }
        }
    }

    async fn exchange(
        &self,
        transport: &dyn Transport,
        credentials: &dyn CredentialProvider,
    ) -> Result<(), RefreshError> {
        let refresh_token = credentials
            .refresh_credential()
            .ok_or(RefreshError::MissingCredential)?;
        let body = serde_json::to_value(RefreshTokenRequest {
            refresh_token: &refresh_token,
        })
        .map_err(|e| RefreshError::Payload(e.to_string()))?;

        // No authorization header: the expired credential is not sent.
        let request = TransportRequest {
            method: Method::POST,
            url: self.refresh_url.clone(),
            config: RequestConfig::default(),
            body: Some(body),
        };
        let response = transport.send(request).await?;
        if response.status != REFRESH_SUCCESS_STATUS {
            return Err(RefreshError::Rejected(response.status));
        }

        let payload: RefreshTokenResponse =
            serde_json::from_value(response.body.unwrap_or(Value::Null))
                .map_err(|e| RefreshError::Payload(e.to_string()))?;

        let expires_at = match payload.data.expiry.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match DateTimeValue::parse(raw) {
                Ok(value) => Some(*value.as_datetime()),
                Err(e) => {
                    warn!("Ignoring unreadable credential expiry: {}", e);
                    None
                }
            },
            _ => None,
        };

        credentials.set_access_credential(payload.data.jwt_token, expires_at);
        Ok(())
    }
}

fn transition(from: RefreshState, to: RefreshState) {
    debug!("Refresh state: {:?} -> {:?}", from, to);
}
