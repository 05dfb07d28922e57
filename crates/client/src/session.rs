//! The signed-in identity shared by every screen.
//!
//! [`SessionStore`] is the only cross-screen mutable state. It is written by
//! exactly three entry points ([`SessionStore::set_on_login`],
//! [`SessionStore::set_on_register`] and [`SessionStore::clear_on_logout`])
//! and mirrored to a [`SessionStorage`] backend so it survives restarts.
//! A token is never held without a user record, and vice versa.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use gearhub_core::models::{LoginResponse, RegisterResponse};
use gearhub_core::{Role, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from durable session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "roleId")]
    pub role: Role,
}

impl SessionUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Token plus the user it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: SessionUser,
}

impl From<&LoginResponse> for Session {
    fn from(login: &LoginResponse) -> Self {
        Self {
            token: SecretString::from(login.token.clone()),
            user: SessionUser {
                user_id: login.user_id,
                username: login.username.clone(),
                email: login.email.clone(),
                name: login.name.clone(),
                role: login.role_id,
            },
        }
    }
}

/// On-disk shape of a session, stored under fixed keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub auth_token: String,
    pub user: SessionUser,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            auth_token: session.token.expose_secret().to_string(),
            user: session.user.clone(),
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: SecretString::from(stored.auth_token),
            user: stored.user,
        }
    }
}

/// Durable key/value storage for the session.
pub trait SessionStorage: Send + Sync {
    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds garbage.
    fn load(&self) -> Result<Option<StoredSession>, StorageError>;

    /// Persist `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Remove the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Session kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Session kept in process memory; forgotten on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<StoredSession>>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Shared, durable session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    current: RwLock<Option<Session>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Create an empty store backed by `storage`. Call [`Self::restore`] to
    /// pick up a previously persisted session.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                current: RwLock::new(None),
                storage,
            }),
        }
    }

    /// Store that persists nothing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStorage::default()))
    }

    /// Load the persisted session into memory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read. The in-memory
    /// session is left signed out in that case.
    pub async fn restore(&self) -> Result<Option<SessionUser>, StorageError> {
        let stored = self.inner.storage.load()?;
        let user = stored.as_ref().map(|s| s.user.clone());
        *self.inner.current.write().await = stored.map(Session::from);
        Ok(user)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be persisted; the store
    /// then stays as it was.
    pub async fn set_on_login(&self, login: &LoginResponse) -> Result<(), StorageError> {
        self.replace(Session::from(login)).await
    }

    /// Record a successful registration.
    ///
    /// Returns whether a session was started; a registration response without
    /// a token leaves the store signed out.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be persisted; the store
    /// then stays as it was.
    pub async fn set_on_register(
        &self,
        registration: &RegisterResponse,
    ) -> Result<bool, StorageError> {
        let Some(token) = registration.token.clone() else {
            return Ok(false);
        };
        let session = Session {
            token: SecretString::from(token),
            user: SessionUser {
                user_id: registration.user_id,
                username: registration.username.clone(),
                email: registration.email.clone(),
                name: None,
                role: registration.role_id.unwrap_or(Role::User),
            },
        };
        self.replace(session).await?;
        Ok(true)
    }

    /// Forget the session in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be cleared.
    pub async fn clear_on_logout(&self) -> Result<(), StorageError> {
        *self.inner.current.write().await = None;
        self.inner.storage.clear()
    }

    /// Bearer token, if signed in.
    pub async fn token(&self) -> Option<SecretString> {
        self.inner
            .current
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Signed-in user, if any.
    pub async fn user(&self) -> Option<SessionUser> {
        self.inner
            .current
            .read()
            .await
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// Role of the signed-in user, if any.
    pub async fn role(&self) -> Option<Role> {
        self.inner.current.read().await.as_ref().map(|s| s.user.role)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.current.read().await.is_some()
    }

    /// Persist `session`, then make it current. A failed save leaves the
    /// previous in-memory session in place.
    async fn replace(&self, session: Session) -> Result<(), StorageError> {
        let stored = StoredSession::from(&session);
        let mut current = self.inner.current.write().await;
        self.inner.storage.save(&stored)?;
        *current = Some(session);
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(role: Role) -> LoginResponse {
        LoginResponse {
            token: "tok-123".to_string(),
            user_id: UserId::new(7),
            username: "mod01".to_string(),
            email: "mod01@gearhub.test".to_string(),
            role_id: role,
            name: Some("Moderator One".to_string()),
        }
    }

    struct ReadOnlyStorage;

    impl SessionStorage for ReadOnlyStorage {
        fn load(&self) -> Result<Option<StoredSession>, StorageError> {
            Ok(None)
        }

        fn save(&self, _session: &StoredSession) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn temp_session_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gearhub-session-{tag}-{}", std::process::id()))
            .join("session.json")
    }

    #[tokio::test]
    async fn test_failed_save_keeps_store_signed_out() {
        let store = SessionStore::new(Arc::new(ReadOnlyStorage));

        let err = store
            .set_on_login(&login(Role::Admin))
            .await
            .expect_err("read-only storage");

        assert!(matches!(err, StorageError::Io(_)));
        assert!(!store.is_authenticated().await);
        assert!(store.token().await.is_none());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated().await);

        store.set_on_login(&login(Role::Moderator)).await.expect("login");
        assert_eq!(store.role().await, Some(Role::Moderator));
        assert_eq!(
            store.token().await.map(|t| t.expose_secret().to_string()),
            Some("tok-123".to_string())
        );

        store.clear_on_logout().await.expect("logout");
        assert!(store.token().await.is_none());
        assert!(store.user().await.is_none());
    }

    #[tokio::test]
    async fn test_restore_from_shared_storage() {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemorySessionStorage::default());
        let first = SessionStore::new(Arc::clone(&storage));
        first.set_on_login(&login(Role::Admin)).await.expect("login");

        let second = SessionStore::new(storage);
        assert!(second.user().await.is_none());
        let restored = second.restore().await.expect("restore");
        assert_eq!(restored.map(|u| u.role), Some(Role::Admin));
        assert!(second.token().await.is_some());
    }

    #[tokio::test]
    async fn test_register_without_token_stays_signed_out() {
        let store = SessionStore::in_memory();
        let registration = RegisterResponse {
            user_id: UserId::new(11),
            username: "newbie".to_string(),
            email: "newbie@gearhub.test".to_string(),
            token: None,
            role_id: None,
            created_at: None,
            message: None,
        };
        assert!(!store.set_on_register(&registration).await.expect("register"));
        assert!(!store.is_authenticated().await);

        let with_token = RegisterResponse {
            token: Some("fresh".to_string()),
            ..registration
        };
        assert!(store.set_on_register(&with_token).await.expect("register"));
        assert_eq!(store.role().await, Some(Role::User));
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let path = temp_session_path("roundtrip");
        let storage = FileSessionStorage::new(&path);
        let store = SessionStore::new(Arc::new(storage.clone()));
        store.set_on_login(&login(Role::User)).await.expect("login");

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("json");
        assert_eq!(raw["auth_token"], "tok-123");
        assert_eq!(raw["user"]["roleId"], 3);

        let loaded = storage.load().expect("load").expect("present");
        assert_eq!(loaded.user.username, "mod01");

        store.clear_on_logout().await.expect("logout");
        assert!(storage.load().expect("load").is_none());
        storage.clear().expect("clearing twice is fine");
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let path = temp_session_path("corrupt");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, b"{not json").expect("write");
        let storage = FileSessionStorage::new(&path);
        assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
        storage.clear().expect("clear");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user = SessionUser {
            user_id: UserId::new(1),
            username: "admin".to_string(),
            email: "admin@gearhub.test".to_string(),
            name: Some(String::new()),
            role: Role::Admin,
        };
        assert_eq!(user.display_name(), "admin");
    }
}
