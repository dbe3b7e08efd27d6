//! Session cookie persistence
//!
//! A browser keeps the backend's `sessionid`/`csrftoken` cookies between page
//! loads; the CLI keeps them in a small JSON file between invocations. Only
//! the transport session is stored here. The user identity is never written
//! to disk and is re-derived by the identity check on every start.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Server the cookies belong to
    pub server_url: String,
    /// Cookie header value, e.g. `csrftoken=abc; sessionid=xyz`
    pub cookies: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored cookies for `server_url`, if any.
    ///
    /// A corrupt file or one written for another server is treated as no
    /// session.
    pub fn load(&self, server_url: &str) -> Option<StoredSession> {
        let content = std::fs::read_to_string(&self.path).ok()?;

        match serde_json::from_str::<StoredSession>(&content) {
            Ok(stored) if same_server(&stored.server_url, server_url) => Some(stored),
            Ok(stored) => {
                debug!(stored = %stored.server_url, current = %server_url, "Ignoring session for another server");
                None
            },
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Ignoring unreadable session file");
                None
            },
        }
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// Remove the stored session. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn same_server(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
