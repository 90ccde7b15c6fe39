//! Persistence of the Matrix login between restarts.
//!
//! The data directory holds two entries:
//! - `session`: JSON file with the Matrix user session and the last sync token
//! - `sqlite`: SQLite store of the Matrix SDK, encrypted with the passphrase

use std::path::Path;

use log::{debug, trace, warn};
use matrix_sdk::authentication::matrix::MatrixSession;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::utils::get_path;

/// Content of the `session` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    user_session: MatrixSession,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Reads and writes the `session` file of a data directory.
///
/// # Examples
///
/// ```no_run
/// # use wynnbot::matrix::session::SessionStore;
/// # async fn example() {
/// let store = SessionStore::load("./data").await;
/// if store.user_session().is_none() {
///     // first start, log in with the password
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Session read from disk, if any
    stored: Option<StoredSession>,
    /// `<data>/session`
    session_path: String,
    /// `<data>/sqlite`
    sqlite_path: String,
}

impl SessionStore {
    /// Loads the session stored in `data_path`.
    ///
    /// A missing or unreadable session file gives a store without session, so
    /// the bot logs in again.
    pub async fn load(data_path: &str) -> Self {
        let session_path = get_path(data_path, "session");
        let sqlite_path = get_path(data_path, "sqlite");
        debug!("session path {}, sqlite path {}", session_path, sqlite_path);

        let stored = match read_session(&session_path).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("ignoring session file {}: {}", session_path, e);
                None
            }
        };
        debug!("found user session: {}", stored.is_some());

        SessionStore {
            stored,
            session_path,
            sqlite_path,
        }
    }

    pub fn sqlite_path(&self) -> &str {
        &self.sqlite_path
    }

    pub fn user_session(&self) -> Option<&MatrixSession> {
        self.stored.as_ref().map(|stored| &stored.user_session)
    }

    /// Sync token of the last completed sync.
    pub fn sync_token(&self) -> Option<&str> {
        self.stored
            .as_ref()
            .and_then(|stored| stored.sync_token.as_deref())
    }

    /// Writes a new user session, forgetting any previous sync token.
    pub async fn save_user_session(&mut self, user_session: &MatrixSession) -> anyhow::Result<()> {
        trace!("persist user session");

        let stored = StoredSession {
            user_session: user_session.clone(),
            sync_token: None,
        };
        write_session(&self.session_path, &stored).await?;
        self.stored = Some(stored);

        Ok(())
    }

    /// Updates the sync token of the session file.
    ///
    /// # Errors
    ///
    /// Returns an error if no user session was saved before, or if the file
    /// cannot be written.
    pub async fn save_sync_token(&self, sync_token: &str) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        // Re-read the file so that concurrent writers never drop the user session
        let Some(mut stored) = read_session(&self.session_path).await? else {
            anyhow::bail!("no user session to attach the sync token to");
        };
        stored.sync_token = Some(sync_token.to_string());

        write_session(&self.session_path, &stored).await
    }
}

async fn read_session(session_path: &str) -> anyhow::Result<Option<StoredSession>> {
    if !Path::new(session_path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_path).await?;
    Ok(Some(serde_json::from_str(&content)?))
}

async fn write_session(session_path: &str, stored: &StoredSession) -> anyhow::Result<()> {
    let content = serde_json::to_string(stored)?;
    fs::write(session_path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use matrix_sdk::{SessionMeta, SessionTokens};
    use tempfile::TempDir;

    use super::*;

    fn create_user_session() -> MatrixSession {
        MatrixSession {
            meta: SessionMeta {
                user_id: "@wynnbot:example.com".try_into().unwrap(),
                device_id: "DEVICEID".into(),
            },
            tokens: SessionTokens {
                access_token: "access_token".to_string(),
                refresh_token: None,
            },
        }
    }

    fn data_path(temp_dir: &TempDir) -> String {
        temp_dir.path().to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_load_without_session_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_path = data_path(&temp_dir);

        let store = SessionStore::load(&data_path).await;

        assert!(store.user_session().is_none());
        assert!(store.sync_token().is_none());
        assert_eq!(store.sqlite_path(), get_path(&data_path, "sqlite"));
    }

    #[tokio::test]
    async fn test_load_ignores_invalid_session_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_path = data_path(&temp_dir);
        fs::write(get_path(&data_path, "session"), "invalid json")
            .await
            .unwrap();

        let store = SessionStore::load(&data_path).await;

        assert!(store.user_session().is_none());
    }

    #[tokio::test]
    async fn test_user_session_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let data_path = data_path(&temp_dir);

        let mut store = SessionStore::load(&data_path).await;
        store
            .save_user_session(&create_user_session())
            .await
            .unwrap();
        assert!(store.user_session().is_some());

        let restored = SessionStore::load(&data_path).await;
        assert_eq!(
            restored.user_session().unwrap().meta.user_id.to_string(),
            "@wynnbot:example.com"
        );
        assert!(restored.sync_token().is_none());
    }

    #[tokio::test]
    async fn test_sync_token_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let data_path = data_path(&temp_dir);

        let mut store = SessionStore::load(&data_path).await;
        store
            .save_user_session(&create_user_session())
            .await
            .unwrap();
        store.save_sync_token("s72594_4483_1934").await.unwrap();
        store.save_sync_token("s72595_4484_1934").await.unwrap();

        let restored = SessionStore::load(&data_path).await;
        assert_eq!(restored.sync_token(), Some("s72595_4484_1934"));
        assert!(restored.user_session().is_some());
    }

    #[tokio::test]
    async fn test_sync_token_requires_user_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::load(&data_path(&temp_dir)).await;

        assert!(store.save_sync_token("s1").await.is_err());
    }

    #[test]
    fn test_session_file_omits_missing_sync_token() {
        let stored = StoredSession {
            user_session: create_user_session(),
            sync_token: None,
        };

        let serialized = serde_json::to_string(&stored).unwrap();

        assert!(!serialized.contains("sync_token"));
        assert!(serialized.contains("@wynnbot:example.com"));
    }
}
