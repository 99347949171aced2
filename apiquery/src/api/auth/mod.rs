//! Credential handling for the request pipeline

pub mod refresh;
pub mod session;

pub use refresh::{RefreshCoordinator, RefreshError, RefreshMode, RefreshOutcome, RefreshState};
pub use session::{
    Alert, AlertSink, CredentialProvider, Credentials, MemorySession, SessionContext,
    SessionHandler,
};
