//! Authentication context
//!
//! The API client never touches persisted credentials directly. It asks an
//! [`AuthContext`] for the current bearer token and tells it when the server
//! answered 401. [`SessionAuth`] is the standard implementation: the token and
//! the serialized user live in a key/value [`SessionStore`] under the keys
//! `token` and `user`, and an expired session clears both and sends the
//! [`Navigator`] to `/login`.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Store key holding the bearer token
pub const TOKEN_KEY: &str = "token";
/// Store key holding the serialized user
pub const USER_KEY: &str = "user";
/// Route shown after the session is dropped
pub const LOGIN_ROUTE: &str = "/login";

/// Persistent key/value storage for session state
pub trait SessionStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Where the console goes next; the terminal front end prints a hint, tests record the route.
pub trait Navigator: Send + Sync + Debug {
    fn navigate(&self, route: &str);
}

/// What the API client needs to know about authentication
pub trait AuthContext: Send + Sync + Debug {
    /// Current bearer token, if logged in
    fn token(&self) -> Option<String>;

    /// Called once for every 401 from a non-auth endpoint
    fn on_unauthorized(&self);
}

/// The logged-in user as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(deserialize_with = "td_common::lenient::id")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

// ============================================================================
// Stores
// ============================================================================

/// In-memory store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// JSON file store, rewritten on every change
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Session file unreadable, starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut values = self.values.write();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

// ============================================================================
// Navigators
// ============================================================================

/// Records every navigation
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.routes.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}

// ============================================================================
// SessionAuth
// ============================================================================

/// Store-backed auth context
#[derive(Debug, Clone)]
pub struct SessionAuth {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionAuth {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Unpersisted session that remembers navigations; handy for tests and mock runs.
    pub fn in_memory() -> (Self, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let auth = Self::new(Arc::new(MemorySessionStore::new()), navigator.clone());
        (auth, navigator)
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Persist a fresh login.
    pub fn save(&self, token: &str, user: &SessionUser) -> io::Result<()> {
        let user_json = serde_json::to_string(user)?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &user_json)
    }

    /// Drop token and user.
    pub fn clear(&self) -> io::Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        let raw = self.store.get(USER_KEY)?;
        serde_json::from_str(&raw)
            .map_err(|e| debug!(error = %e, "Stored user is not valid JSON"))
            .ok()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

impl AuthContext for SessionAuth {
    fn token(&self) -> Option<String> {
        self.store
            .get(TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    fn on_unauthorized(&self) {
        warn!("Session rejected by the server, clearing stored credentials");
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.navigator.navigate(LOGIN_ROUTE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: "1".into(),
            username: "admin".into(),
            email: Some("admin@example.com".into()),
            role: Some("admin".into()),
        }
    }

    #[test]
    fn test_unauthorized_clears_and_redirects() {
        let (auth, navigator) = SessionAuth::in_memory();
        auth.save("abc", &user()).unwrap();
        assert_eq!(auth.token().as_deref(), Some("abc"));

        auth.on_unauthorized();

        assert!(auth.store().get(TOKEN_KEY).is_none());
        assert!(auth.store().get(USER_KEY).is_none());
        assert_eq!(navigator.routes(), vec![LOGIN_ROUTE.to_string()]);
    }

    #[test]
    fn test_blank_token_counts_as_logged_out() {
        let (auth, _) = SessionAuth::in_memory();
        auth.store().set(TOKEN_KEY, "  ").unwrap();
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        {
            let store = FileSessionStore::open(&path).unwrap();
            store.set(TOKEN_KEY, "persisted").unwrap();
        }

        let store = FileSessionStore::open(&path).unwrap();
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("persisted"));

        store.remove(TOKEN_KEY).unwrap();
        let store = FileSessionStore::open(&path).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::open(&path).unwrap();
        assert!(store.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_current_user_roundtrip() {
        let (auth, _) = SessionAuth::in_memory();
        auth.save("t", &user()).unwrap();
        assert_eq!(auth.current_user(), Some(user()));
    }
}
