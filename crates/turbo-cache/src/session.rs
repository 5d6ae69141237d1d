//! Platform sessions stored in the Key-Value store.

use crate::{Cache, CacheError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A live platform session: an id plus a free-form mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The session ID.
    pub id: SessionId,
    /// Session values.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// When the session was created (Unix timestamp).
    pub created_at: u64,
    /// When the session was last saved (Unix timestamp).
    pub last_accessed: u64,
}

impl Session {
    /// Create an empty session with the given id.
    pub fn new(id: SessionId) -> Self {
        let now = now_secs();
        Self {
            id,
            data: Map::new(),
            created_at: now,
            last_accessed: now,
        }
    }

    /// Read a session value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Assign a session value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Remove a session value, returning it if present.
    pub fn pop(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }
}

/// Loads and saves [`Session`]s in a [`Cache`].
///
/// # Example
///
/// ```rust,ignore
/// let sessions = SessionStore::new(cache);
/// let mut session = sessions.load_or_create(cookie_id)?;
/// session.set("flash", json!("saved"));
/// sessions.save(&mut session)?;
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: Cache,
}

impl SessionStore {
    /// Create a session store over `cache`.
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Load a session if it exists.
    pub fn load(&self, id: &SessionId) -> Result<Option<Session>, CacheError> {
        self.cache.get::<Session>(&session_key(id))
    }

    /// Load a session, or start a fresh one under `id` if none is stored.
    ///
    /// A fresh session is not written until [`save`](Self::save) is called.
    pub fn load_or_create(&self, id: Option<SessionId>) -> Result<Session, CacheError> {
        match id {
            Some(id) => match self.load(&id)? {
                Some(session) => Ok(session),
                None => Ok(Session::new(id)),
            },
            None => Ok(Session::new(SessionId::generate())),
        }
    }

    /// Persist a session, refreshing its access time.
    pub fn save(&self, session: &mut Session) -> Result<(), CacheError> {
        session.last_accessed = now_secs();
        tracing::debug!(session = %session.id, keys = session.data.len(), "saving session");
        self.cache.set(&session_key(&session.id), session)
    }

    /// Delete a session.
    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&session_key(id))
    }

    /// Check if a session exists.
    pub fn exists(&self, id: &SessionId) -> Result<bool, CacheError> {
        self.cache.exists(&session_key(id))
    }
}

fn session_key(id: &SessionId) -> String {
    format!("session:{}", id)
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> SessionStore {
        SessionStore::new(Cache::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("display-test");
        assert_eq!(format!("{}", id), "display-test");
    }

    #[test]
    fn test_session_id_generate_format() {
        let id = SessionId::generate();
        let s = id.as_str();

        assert!(s.starts_with("sess_"));
        // 18 bytes base64 encoded = 24 chars, plus "sess_"
        assert_eq!(s.len(), 29);
    }

    #[test]
    fn test_session_id_generate_uniqueness() {
        let id1 = SessionId::generate();
        let id2 = SessionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_serialization() {
        let id = SessionId::new("serialize-me");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""serialize-me""#);
    }

    #[test]
    fn test_session_get_set_pop() {
        let mut session = Session::new(SessionId::new("s1"));
        assert!(session.get("k").is_none());

        session.set("k", json!({"a": 1}));
        assert_eq!(session.get("k"), Some(&json!({"a": 1})));

        assert_eq!(session.pop("k"), Some(json!({"a": 1})));
        assert_eq!(session.pop("k"), None);
    }

    #[test]
    fn test_store_save_and_load() {
        let sessions = store();
        let mut session = Session::new(SessionId::new("s1"));
        session.set("flash", json!("hi"));
        sessions.save(&mut session).unwrap();

        let loaded = sessions.load(&SessionId::new("s1")).unwrap().unwrap();
        assert_eq!(loaded.get("flash"), Some(&json!("hi")));
        assert!(sessions.exists(&SessionId::new("s1")).unwrap());
    }

    #[test]
    fn test_load_or_create_unknown_id_keeps_id() {
        let sessions = store();
        let session = sessions
            .load_or_create(Some(SessionId::new("fresh")))
            .unwrap();
        assert_eq!(session.id.as_str(), "fresh");
        assert!(session.data.is_empty());
        assert!(!sessions.exists(&session.id).unwrap());
    }

    #[test]
    fn test_load_or_create_without_id_generates() {
        let sessions = store();
        let session = sessions.load_or_create(None).unwrap();
        assert!(session.id.as_str().starts_with("sess_"));
    }

    #[test]
    fn test_delete() {
        let sessions = store();
        let mut session = Session::new(SessionId::new("gone"));
        sessions.save(&mut session).unwrap();
        sessions.delete(&session.id).unwrap();
        assert!(sessions.load(&session.id).unwrap().is_none());
    }
}
