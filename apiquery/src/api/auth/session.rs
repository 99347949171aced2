//! Session collaborators
//!
//! The pipeline never reaches for global state: whoever builds the client
//! injects a [`SessionContext`] holding the credential store, the sign-out
//! hook and the alert channel.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use log::debug;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Holds and replaces the bearer credentials.
pub trait CredentialProvider: Send + Sync {
    /// Current access credential, if signed in.
    fn access_credential(&self) -> Option<String>;

    /// Credential presented to the refresh endpoint.
    fn refresh_credential(&self) -> Option<String>;

    /// Replace the access credential and its expiry as one value.
    fn set_access_credential(&self, token: String, expires_at: Option<DateTime<Utc>>);
}

/// Ends the session when the refresh protocol gives up.
pub trait SessionHandler: Send + Sync {
    fn force_sign_out(&self);
}

/// User-facing notification channel.
pub trait AlertSink: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// The three collaborators the pipeline is constructed with.
#[derive(Clone)]
pub struct SessionContext {
    pub credentials: Arc<dyn CredentialProvider>,
    pub session: Arc<dyn SessionHandler>,
    pub alerts: Arc<dyn AlertSink>,
}

impl SessionContext {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        session: Arc<dyn SessionHandler>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            credentials,
            session,
            alerts,
        }
    }

    /// Context backed by one value implementing all three roles.
    pub fn from_shared<S>(shared: Arc<S>) -> Self
    where
        S: CredentialProvider + SessionHandler + AlertSink + 'static,
    {
        Self {
            credentials: shared.clone(),
            session: shared.clone(),
            alerts: shared,
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("signed_in", &self.credentials.access_credential().is_some())
            .finish_non_exhaustive()
    }
}

/// Snapshot of the stored credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            expires_at: None,
        }
    }

    /// Copy with the access token and expiry replaced, refresh token kept.
    pub fn with_access(&self, token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: Some(token),
            refresh_token: self.refresh_token.clone(),
            expires_at,
        }
    }
}

// Tokens never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A raised alert, as recorded by [`MemorySession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// In-process session implementing all three collaborators.
///
/// Credentials swap atomically; alerts and sign-outs are recorded so
/// embedders (and tests) can inspect them.
#[derive(Debug, Default)]
pub struct MemorySession {
    credentials: ArcSwap<Credentials>,
    alerts: Mutex<Vec<Alert>>,
    sign_outs: AtomicUsize,
}

impl MemorySession {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: ArcSwap::from_pointee(credentials),
            alerts: Mutex::new(Vec::new()),
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials.load().as_ref().clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn into_context(self: Arc<Self>) -> SessionContext {
        SessionContext::from_shared(self)
    }
}

impl CredentialProvider for MemorySession {
    fn access_credential(&self) -> Option<String> {
        self.credentials.load().access_token.clone()
    }

    fn refresh_credential(&self) -> Option<String> {
        self.credentials.load().refresh_token.clone()
    }

    fn set_access_credential(&self, token: String, expires_at: Option<DateTime<Utc>>) {
        self.credentials
            .rcu(|current| current.with_access(token.clone(), expires_at));
        debug!("Access credential replaced (expires at {:?})", expires_at);
    }
}

impl SessionHandler for MemorySession {
    fn force_sign_out(&self) {
        self.credentials.store(Arc::new(Credentials::default()));
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
    }
}

impl AlertSink for MemorySession {
    fn notify(&self, title: &str, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Alert {
                title: title.to_string(),
                message: message.to_string(),
            });
    }
}
