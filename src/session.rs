// Client session provider
// Owns the "current user" of a portal client: populated at login or registration,
// cleared at logout, and restored from storage at startup with a periodic
// re-check against the current-user lookup.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::error::AuthError;
use crate::auth::models::{AuthResponse, UserResponse};

/// Stored sessions older than this are re-verified on startup
pub const DEFAULT_REVERIFY_AFTER_MINS: i64 = 30;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored session is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Persisted session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
    pub last_verified_at: DateTime<Utc>,
}

/// Where a session survives between client runs
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<Option<Session>, SessionError>;

    async fn save(&self, session: &Session) -> Result<(), SessionError>;

    async fn clear(&self) -> Result<(), SessionError>;
}

/// Resolves a token to the user it currently belongs to
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_identity(&self, token: &str) -> Result<UserResponse, AuthError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    slot: Mutex<Option<Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.slot.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}

/// Session kept as a JSON document on disk
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let contents = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Single owner of the client's current session
pub struct SessionProvider {
    storage: Arc<dyn SessionStorage>,
    verifier: Arc<dyn IdentityVerifier>,
    reverify_after: Duration,
    current: Option<Session>,
}

impl SessionProvider {
    pub fn new(storage: Arc<dyn SessionStorage>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            storage,
            verifier,
            reverify_after: Duration::minutes(DEFAULT_REVERIFY_AFTER_MINS),
            current: None,
        }
    }

    pub fn with_reverify_after(mut self, reverify_after: Duration) -> Self {
        self.reverify_after = reverify_after;
        self
    }

    /// Restore the stored session.
    ///
    /// A stale session is re-verified; if that fails, or the stored state
    /// cannot be read, storage is cleared and the client starts signed out.
    pub async fn init(&mut self, now: DateTime<Utc>) -> Result<Option<&UserResponse>, SessionError> {
        self.current = None;

        let stored = match self.storage.load().await {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Discarding unreadable session: {}", e);
                self.storage.clear().await?;
                return Ok(None);
            }
        };

        if now - stored.last_verified_at <= self.reverify_after {
            self.current = Some(stored);
            return Ok(self.current_user());
        }

        match self.verifier.verify_identity(&stored.token).await {
            Ok(user) => {
                debug!("Stored session re-verified for user_id={}", user.id);
                let refreshed = Session {
                    token: stored.token,
                    user,
                    last_verified_at: now,
                };
                self.storage.save(&refreshed).await?;
                self.current = Some(refreshed);
                Ok(self.current_user())
            }
            Err(e) => {
                debug!("Stored session rejected: {}", e);
                self.storage.clear().await?;
                Ok(None)
            }
        }
    }

    /// Adopt the result of a successful login or registration
    pub async fn establish(
        &mut self,
        response: AuthResponse,
        now: DateTime<Utc>,
    ) -> Result<&UserResponse, SessionError> {
        let session = Session {
            token: response.token,
            user: response.user,
            last_verified_at: now,
        };
        self.storage.save(&session).await?;
        Ok(&self.current.insert(session).user)
    }

    /// Log out
    pub async fn teardown(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.storage.clear().await
    }

    pub fn current_user(&self) -> Option<&UserResponse> {
        self.current.as_ref().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|session| session.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user(id: i32, name_latin: &str) -> UserResponse {
        UserResponse {
            id,
            uin: "8412129874".to_string(),
            uin_foreigner: None,
            name_cyrillic: "Потребител Тестов".to_string(),
            name_latin: name_latin.to_string(),
            email: "testuser@example.com".to_string(),
            phone_number: "+359 88 123 4567".to_string(),
            address: "ул. Граф Игнатиев 18, София, 1000".to_string(),
            username: "testuser".to_string(),
            role: RoleCode::User,
            created_at: Utc::now(),
        }
    }

    /// Verifier that accepts a single token and counts calls
    struct StubVerifier {
        valid_token: &'static str,
        user: UserResponse,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityVerifier for StubVerifier {
        async fn verify_identity(&self, token: &str) -> Result<UserResponse, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if token == self.valid_token {
                Ok(self.user.clone())
            } else {
                Err(AuthError::InvalidToken)
            }
        }
    }

    fn verifier(user: UserResponse) -> Arc<StubVerifier> {
        Arc::new(StubVerifier {
            valid_token: "good-token",
            user,
            calls: AtomicUsize::new(0),
        })
    }

    fn stored(token: &str, last_verified_at: DateTime<Utc>) -> Session {
        Session {
            token: token.to_string(),
            user: user(1, "User Testov"),
            last_verified_at,
        }
    }

    #[tokio::test]
    async fn test_fresh_session_is_restored_without_verification() {
        let now = Utc::now();
        let storage = Arc::new(InMemorySessionStorage::new());
        storage.save(&stored("good-token", now - Duration::minutes(5))).await.unwrap();
        let verifier = verifier(user(1, "Renamed"));

        let mut provider = SessionProvider::new(storage, verifier.clone());
        let restored = provider.init(now).await.unwrap().cloned();

        assert_eq!(restored.unwrap().name_latin, "User Testov");
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.token(), Some("good-token"));
    }

    #[tokio::test]
    async fn test_stale_session_is_reverified_and_refreshed() {
        let now = Utc::now();
        let storage = Arc::new(InMemorySessionStorage::new());
        storage.save(&stored("good-token", now - Duration::minutes(31))).await.unwrap();
        let verifier = verifier(user(1, "Renamed"));

        let mut provider = SessionProvider::new(storage.clone(), verifier.clone());
        provider.init(now).await.unwrap();

        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.current_user().unwrap().name_latin, "Renamed");
        let saved = storage.load().await.unwrap().unwrap();
        assert_eq!(saved.last_verified_at, now);
        assert_eq!(saved.user.name_latin, "Renamed");
    }

    #[tokio::test]
    async fn test_rejected_session_is_cleared() {
        let now = Utc::now();
        let storage = Arc::new(InMemorySessionStorage::new());
        storage.save(&stored("revoked-token", now - Duration::hours(2))).await.unwrap();

        let mut provider = SessionProvider::new(storage.clone(), verifier(user(1, "User Testov")));
        assert!(provider.init(now).await.unwrap().is_none());

        assert!(!provider.is_authenticated());
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_establish_and_teardown() {
        let now = Utc::now();
        let storage = Arc::new(InMemorySessionStorage::new());
        let mut provider = SessionProvider::new(storage.clone(), verifier(user(1, "User Testov")));

        assert!(provider.init(now).await.unwrap().is_none());

        let response = AuthResponse::new(user(7, "Alice Testova"), "issued-token".to_string());
        let current = provider.establish(response, now).await.unwrap();
        assert_eq!(current.id, 7);
        assert!(provider.is_authenticated());
        assert_eq!(storage.load().await.unwrap().unwrap().token, "issued-token");

        provider.teardown().await.unwrap();
        assert!(!provider.is_authenticated());
        assert!(provider.token().is_none());
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));

        assert!(storage.load().await.unwrap().is_none());

        let session = stored("good-token", Utc::now());
        storage.save(&session).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(session));

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let storage = Arc::new(FileSessionStorage::new(&path));
        let mut provider = SessionProvider::new(storage, verifier(user(1, "User Testov")));

        assert!(provider.init(Utc::now()).await.unwrap().is_none());
        assert!(!path.exists());
    }
}
