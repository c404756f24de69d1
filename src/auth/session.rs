use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::models::UserProfile;
use crate::storage::Storage;

/// Storage key for the bearer token
const TOKEN_KEY: &str = "token";

/// Storage key for the JSON-serialized user profile
const USER_KEY: &str = "user";

/// The authenticated identity for the current run.
///
/// An empty token means "no session", and only then may the profile be
/// absent: a live session always carries both.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: String,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

struct AuthInner {
    session: Session,
    storage: Arc<dyn Storage>,
}

/// Shared, mutable authentication state.
///
/// Cheap to clone; every handle sees the same session. The API client holds
/// one to inject the bearer token and to clear the session on a 401, the
/// router guard holds one to decide navigation. Mutations are synchronous,
/// so a reader immediately after `set_session`/`clear_session` never sees
/// a stale value.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<Mutex<AuthInner>>,
}

impl AuthStore {
    /// Build the store and rehydrate any persisted session.
    ///
    /// Partial or malformed persisted data (a token without a parsable
    /// profile, or the other way round) counts as no session at all.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let session = Self::rehydrate(storage.as_ref());
        Self {
            inner: Arc::new(Mutex::new(AuthInner { session, storage })),
        }
    }

    fn rehydrate(storage: &dyn Storage) -> Session {
        let token = match storage.get(TOKEN_KEY) {
            Some(token) if !token.is_empty() => token,
            _ => return Session::default(),
        };
        let user = storage
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "Persisted user profile is malformed, discarding session");
                    None
                }
            });
        match user {
            Some(user) => {
                debug!(email = %user.email, "Restored session from storage");
                Session {
                    token,
                    user: Some(user),
                }
            }
            None => Session::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the current session and persist it.
    pub fn set_session(&self, token: String, user: UserProfile) -> Result<()> {
        if token.is_empty() {
            bail!("session token must be non-empty");
        }
        let mut inner = self.lock();
        inner.storage.set(TOKEN_KEY, &token);
        match serde_json::to_string(&user) {
            Ok(raw) => inner.storage.set(USER_KEY, &raw),
            Err(err) => warn!(error = %err, "Could not serialize user profile for storage"),
        }
        inner.session = Session {
            token,
            user: Some(user),
        };
        Ok(())
    }

    /// Drop the session from memory and storage. Idempotent: clearing an
    /// already-empty session (say, a 401 arriving after a logout) is a no-op.
    pub fn clear_session(&self) {
        let mut inner = self.lock();
        inner.storage.remove(TOKEN_KEY);
        inner.storage.remove(USER_KEY);
        inner.session = Session::default();
    }

    /// Derived flag: true iff the token is non-empty. Recomputed from the
    /// stored session on every call.
    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated()
    }

    /// The bearer token, if a session is active.
    pub fn token(&self) -> Option<String> {
        let inner = self.lock();
        if inner.session.token.is_empty() {
            None
        } else {
            Some(inner.session.token.clone())
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn profile() -> UserProfile {
        UserProfile {
            id: 7,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: "user".to_string(),
        }
    }

    #[test]
    fn set_session_is_visible_immediately() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        assert!(!store.is_authenticated());

        store.set_session("abc123".to_string(), profile()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("abc123"));
        assert_eq!(store.session().user.unwrap().name, "Ada");
    }

    #[test]
    fn empty_token_is_rejected() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.set_session(String::new(), profile()).is_err());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn clear_session_is_idempotent() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(Arc::clone(&storage));
        store.set_session("abc123".to_string(), profile()).unwrap();

        store.clear_session();
        assert!(!store.is_authenticated());
        assert_eq!(storage.get("token"), None);
        assert_eq!(storage.get("user"), None);

        // Second clear (e.g. a late 401 after logout) changes nothing.
        store.clear_session();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn rehydrate_restores_a_persisted_session() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(Arc::clone(&storage));
        store.set_session("abc123".to_string(), profile()).unwrap();

        // A fresh store over the same backend simulates a restart.
        let restored = AuthStore::new(Arc::clone(&storage));
        assert!(restored.is_authenticated());
        assert_eq!(restored.token().as_deref(), Some("abc123"));
        assert_eq!(restored.session().user.unwrap().email, "ada@example.com");
    }

    #[test]
    fn malformed_persisted_user_means_no_session() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("token", "abc123");
        storage.set("user", "{not json");

        let store = AuthStore::new(Arc::clone(&storage));
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn token_without_user_means_no_session() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("token", "abc123");

        let store = AuthStore::new(Arc::clone(&storage));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn shared_handles_see_the_same_session() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        let observer = store.clone();

        store.set_session("abc123".to_string(), profile()).unwrap();
        assert!(observer.is_authenticated());

        observer.clear_session();
        assert!(!store.is_authenticated());
    }
}
