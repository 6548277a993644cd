//! Browsing-session persistence
//!
//! A [`SessionState`] is an opaque snapshot of a browsing context: cookie
//! records exactly as the browser engine reported them, plus local-storage
//! entries per origin. The login flow writes one wholesale; the browser
//! controller reads one to seed authenticated contexts. Beyond
//! "exists or not", nothing in this crate interprets the payload.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Local-storage entries captured for one origin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginState {
    pub origin: String,
    pub local_storage: Vec<(String, String)>,
}

/// Serialized snapshot of a browsing context
///
/// Overwritten wholesale on every successful login; never partially merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Cookie records as emitted by the browser engine, kept as raw JSON
    pub cookies: Vec<serde_json::Value>,
    pub origins: Vec<OriginState>,
}

impl SessionState {
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.origins.is_empty()
    }
}

/// Persists and loads [`SessionState`] at a fixed file path
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

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize `state` to the store's path, creating parent directories
    /// as needed.
    ///
    /// The payload is fully serialized in memory before the file is
    /// touched, so a serialization failure cannot clobber an existing
    /// session. A partial write on crash remains possible.
    pub async fn save(&self, state: &SessionState) -> Result<(), CaptureError> {
        let payload = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, payload).await?;

        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Load the stored state, or `None` if no session file exists.
    ///
    /// Absence is a normal outcome, never an error; only an unreadable or
    /// undecodable file fails.
    pub async fn load(&self) -> Result<Option<SessionState>, CaptureError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(CaptureError::IoError(e.to_string())),
        };

        let state: SessionState = serde_json::from_str(&content)?;
        debug!(
            "Loaded session from {} ({} cookies, {} origins)",
            self.path.display(),
            state.cookies.len(),
            state.origins.len()
        );
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("no_such_session.json"));
        let loaded = store.load().await.unwrap();
        assert!(loaded.is_none());
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data/nested/session.json"));

        let state = SessionState {
            cookies: vec![json!({"name": "sid", "value": "abc123", "domain": ".example.com"})],
            origins: vec![OriginState {
                origin: "https://example.com".to_string(),
                local_storage: vec![("token".to_string(), "xyz".to_string())],
            }],
        };
        store.save(&state).await.unwrap();
        assert!(store.exists());

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.cookies, state.cookies);
        assert_eq!(loaded.origins, state.origins);
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let first = SessionState {
            cookies: vec![json!({"name": "old"})],
            ..Default::default()
        };
        store.save(&first).await.unwrap();

        let second = SessionState {
            cookies: vec![json!({"name": "new"})],
            ..Default::default()
        };
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.cookies.len(), 1);
        assert_eq!(loaded.cookies[0]["name"], "new");
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = SessionStore::new(path);
        assert!(matches!(
            store.load().await,
            Err(CaptureError::SerializationError(_))
        ));
    }
}
