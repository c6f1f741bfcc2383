//! Local session cache: the signed-in user id, persisted under the `userId` key
//! together with the backend tokens that authenticate it.
//!
//! The backend's current-session query is the source of truth; this store is a
//! cache the gateway refreshes on login/session checks and clears on logout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::backend::AuthTokens;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self) -> Result<Option<Session>>;

    async fn set(&self, session: &Session) -> Result<()>;

    async fn remove(&self) -> Result<()>;
}

/// The signed-in caller, resolved once per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// Absent in files written before tokens were persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<AuthTokens>,
}

/// Persists the session as a small JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<Session>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        match serde_json::from_slice::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                debug!("Ignoring unreadable session file {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }

    async fn set(&self, session: &Session) -> Result<()> {
        let body = serde_json::to_vec(session)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing {}", self.path.display()))
    }

    async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// Process-local store, for embedding the gateway without touching disk.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn set(&self, session: &Session) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_tokens() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            tokens: Some(AuthTokens {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        let session = session_with_tokens();

        assert_eq!(store.get().await.unwrap(), None);
        store.set(&session).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(session));

        store.remove().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
        // removing twice is fine
        store.remove().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_uses_user_id_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        let session = session_with_tokens();
        store.set(&session).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["userId"], session.user_id.to_string());
        assert_eq!(raw["tokens"]["access_token"], "access");
        assert_eq!(raw["tokens"]["refresh_token"], "refresh");
    }

    #[tokio::test]
    async fn test_file_without_tokens_still_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let id = Uuid::new_v4();
        std::fs::write(&path, format!(r#"{{"userId":"{id}"}}"#)).unwrap();
        let store = FileSessionStore::new(&path);
        assert_eq!(
            store.get().await.unwrap(),
            Some(Session {
                user_id: id,
                tokens: None
            })
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();
        let store = FileSessionStore::new(&path);
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing").join("session.json"));
        assert!(store.set(&session_with_tokens()).await.is_err());
    }
}
