//! The signed-in session: token and role.
//!
//! [`SessionStore`] is the single injected credential context. It is
//! written exactly once at sign-in and cleared exactly once at sign-out;
//! the HTTP client only ever reads it, at the moment each request is
//! dispatched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Credential and role of the signed-in counselor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: String,
}

/// Errors from reading or writing the persisted session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shared, cheaply cloneable handle to the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// An in-memory store that starts signed out.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restore a store backed by `path`.
    ///
    /// A missing file means "signed out"; a corrupt file is an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let session = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(serde_json::from_slice::<Session>(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), signed_in = session.is_some(), "Loaded session");

        Ok(Self {
            current: Arc::new(RwLock::new(session)),
            path: Some(path),
        })
    }

    /// Store a new session and persist it when a path is configured.
    pub async fn sign_in(&self, session: Session) -> Result<(), SessionError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, serde_json::to_vec(&session)?).await?;
        }
        tracing::info!(role = %session.role, "Signed in");
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Forget the session and remove the persisted copy.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        *self.current.write().await = None;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!("Signed out");
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn role(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.role.clone())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.current.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn counselor() -> Session {
        Session {
            token: "abc123".into(),
            role: "counselor".into(),
        }
    }

    #[tokio::test]
    async fn in_memory_sign_in_and_out() {
        let store = SessionStore::in_memory();
        assert!(!store.is_signed_in().await);

        store.sign_in(counselor()).await.unwrap();
        assert_eq!(store.token().await.as_deref(), Some("abc123"));
        assert_eq!(store.role().await.as_deref(), Some("counselor"));

        store.sign_out().await.unwrap();
        assert_eq!(store.token().await, None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = SessionStore::in_memory();
        let reader = store.clone();
        store.sign_in(counselor()).await.unwrap();
        assert!(reader.is_signed_in().await);
    }

    #[tokio::test]
    async fn persisted_session_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::load(&path).await.unwrap();
        assert!(!store.is_signed_in().await);
        store.sign_in(counselor()).await.unwrap();

        let reloaded = SessionStore::load(&path).await.unwrap();
        assert_eq!(reloaded.token().await.as_deref(), Some("abc123"));

        reloaded.sign_out().await.unwrap();
        assert!(!path.exists());
        let after = SessionStore::load(&path).await.unwrap();
        assert!(!after.is_signed_in().await);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        assert_matches!(SessionStore::load(&path).await, Err(SessionError::Parse(_)));
    }
}
