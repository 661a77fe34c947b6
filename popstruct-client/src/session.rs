//! Session storage
//!
//! The access/refresh token pair is the only state shared across requests.
//! It lives behind a [`SessionProvider`] so the authenticated request layer is
//! its single consumer and tokens are always replaced wholesale.

use popstruct_core::dto::auth::TokenPair;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Opaque token pair of a logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for Session {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Storage for the current session
pub trait SessionProvider: Send + Sync {
    /// Returns the stored session, if any
    fn get(&self) -> Option<Session>;

    /// Replaces the stored session
    fn set(&self, session: Session) -> Result<()>;

    /// Forgets the stored session
    fn clear(&self) -> Result<()>;
}

/// In-memory session, lost when the process exits
#[derive(Debug, Default)]
pub struct MemorySession {
    inner: Mutex<Option<Session>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionProvider for MemorySession {
    fn get(&self) -> Option<Session> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, session: Session) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Session persisted as a JSON file
///
/// Reads go to disk every time so that separate CLI invocations observe each
/// other's refreshes.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionProvider for FileSession {
    fn get(&self) -> Option<Session> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring malformed session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, session: Session) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::Session(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let body = serde_json::to_vec_pretty(&session)
            .map_err(|e| ClientError::Session(e.to_string()))?;

        // Write then rename so a concurrent reader never sees half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)
            .map_err(|e| ClientError::Session(format!("cannot write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            ClientError::Session(format!("cannot replace {}: {}", self.path.display(), e))
        })?;

        debug!("Session stored in {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Session file {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(format!(
                "cannot remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(tag: &str) -> Session {
        Session {
            access_token: format!("access-{}", tag),
            refresh_token: format!("refresh-{}", tag),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("popstruct-session-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_memory_session() {
        let store = MemorySession::new();
        assert!(store.get().is_none());

        store.set(session("a")).unwrap();
        assert_eq!(store.get(), Some(session("a")));

        store.set(session("b")).unwrap();
        assert_eq!(store.get(), Some(session("b")));

        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_file_session_round_trip() {
        let path = temp_path("round-trip.json");
        let store = FileSession::new(&path);
        store.clear().unwrap();
        assert!(store.get().is_none());

        store.set(session("a")).unwrap();
        assert_eq!(FileSession::new(&path).get(), Some(session("a")));

        store.clear().unwrap();
        assert!(store.get().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_file_session_ignores_garbage() {
        let path = temp_path("garbage.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = FileSession::new(&path);
        assert!(store.get().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_session_from_tokens() {
        let tokens = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: Some("bearer".to_string()),
        };
        let s = Session::from(tokens);
        assert_eq!(s.access_token, "a");
        assert_eq!(s.refresh_token, "r");
    }
}
