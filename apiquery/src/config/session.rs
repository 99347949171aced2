//! File-backed session for the command line
//!
//! Tokens live in `~/.config/apiquery/session.toml`; the in-memory copy is
//! swapped atomically and written through on every change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use colored::Colorize;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ClientConfig;
use crate::api::auth::{AlertSink, CredentialProvider, Credentials, SessionHandler};

/// On-disk shape of the session file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl From<StoredSession> for Credentials {
    fn from(stored: StoredSession) -> Self {
        Credentials {
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            expires_at: stored.expires_at,
        }
    }
}

impl From<&Credentials> for StoredSession {
    fn from(credentials: &Credentials) -> Self {
        StoredSession {
            access_token: credentials.access_token.clone(),
            refresh_token: credentials.refresh_token.clone(),
            expires_at: credentials.expires_at,
        }
    }
}

#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    credentials: ArcSwap<Credentials>,
}

impl FileSession {
    pub fn default_path() -> PathBuf {
        ClientConfig::config_dir().join("session.toml")
    }

    /// Load the session stored at `path`; a missing file is a signed-out
    /// session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stored = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file {}", path.display()))?;
            toml::from_str::<StoredSession>(&content)
                .with_context(|| format!("Failed to parse session file {}", path.display()))?
        } else {
            StoredSession::default()
        };

        Ok(Self {
            path,
            credentials: ArcSwap::from_pointee(stored.into()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Credentials {
        self.credentials.load().as_ref().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.credentials.load().access_token.is_some()
    }

    pub fn store(&self, credentials: Credentials) -> Result<()> {
        self.credentials.store(Arc::new(credentials));
        self.persist()
    }

    /// Forget all tokens and remove the session file.
    pub fn clear(&self) -> Result<()> {
        self.credentials.store(Arc::new(Credentials::default()));
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let stored = StoredSession::from(self.credentials.load().as_ref());
        let content = toml::to_string_pretty(&stored).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict {}", self.path.display()))?;
        }

        debug!("Session written to {}", self.path.display());
        Ok(())
    }
}

impl CredentialProvider for FileSession {
    fn access_credential(&self) -> Option<String> {
        self.credentials.load().access_token.clone()
    }

    fn refresh_credential(&self) -> Option<String> {
        self.credentials.load().refresh_token.clone()
    }

    fn set_access_credential(&self, token: String, expires_at: Option<DateTime<Utc>>) {
        self.credentials
            .rcu(|current| current.with_access(token.clone(), expires_at));
        if let Err(e) = self.persist() {
            warn!("Refreshed credential kept in memory only: {:#}", e);
        }
    }
}

impl SessionHandler for FileSession {
    fn force_sign_out(&self) {
        if let Err(e) = self.clear() {
            warn!("Failed to clear stored session: {:#}", e);
        }
    }
}

impl AlertSink for FileSession {
    fn notify(&self, title: &str, message: &str) {
        eprintln!("{} {}", format!("{title}:").red().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::open(dir.path().join("session.toml")).unwrap();
        assert!(!session.is_signed_in());
        assert!(session.refresh_credential().is_none());
    }

    #[test]
    fn test_store_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let session = FileSession::open(&path).unwrap();
        session.store(Credentials::new("t1", "r1")).unwrap();

        let reopened = FileSession::open(&path).unwrap();
        assert_eq!(reopened.current(), Credentials::new("t1", "r1"));
    }

    #[test]
    fn test_refreshed_credential_is_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let expiry = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let session = FileSession::open(&path).unwrap();
        session.store(Credentials::new("t1", "r1")).unwrap();
        session.set_access_credential("t2".into(), Some(expiry));

        let reopened = FileSession::open(&path).unwrap().current();
        assert_eq!(reopened.access_token.as_deref(), Some("t2"));
        assert_eq!(reopened.refresh_token.as_deref(), Some("r1"));
        assert_eq!(reopened.expires_at, Some(expiry));
    }

    #[test]
    fn test_sign_out_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let session = FileSession::open(&path).unwrap();
        session.store(Credentials::new("t1", "r1")).unwrap();
        session.force_sign_out();

        assert!(!path.exists());
        assert!(!session.is_signed_in());
    }
}
