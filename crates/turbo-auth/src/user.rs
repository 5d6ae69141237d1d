//! User types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A platform user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique ID.
    pub fn generate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("usr_{:x}{:04x}", timestamp, counter & 0xffff))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum User {
    /// Anonymous visitor.
    #[default]
    Anonymous,
    /// Authenticated user.
    Authenticated {
        /// User ID.
        id: UserId,
        /// Login name.
        name: String,
        /// Site administrator flag.
        sysadmin: bool,
    },
}

impl User {
    /// Create an anonymous user.
    pub fn anonymous() -> Self {
        User::Anonymous
    }

    /// Create a regular authenticated user.
    pub fn authenticated(id: UserId, name: impl Into<String>) -> Self {
        User::Authenticated {
            id,
            name: name.into(),
            sysadmin: false,
        }
    }

    /// Create an authenticated site administrator.
    pub fn sysadmin(id: UserId, name: impl Into<String>) -> Self {
        User::Authenticated {
            id,
            name: name.into(),
            sysadmin: true,
        }
    }

    /// Check if user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    /// Get user ID if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            User::Authenticated { id, .. } => Some(id),
            User::Anonymous => None,
        }
    }

    /// Get login name if authenticated.
    pub fn name(&self) -> Option<&str> {
        match self {
            User::Authenticated { name, .. } => Some(name),
            User::Anonymous => None,
        }
    }

    /// Check if user is a site administrator.
    pub fn is_sysadmin(&self) -> bool {
        matches!(self, User::Authenticated { sysadmin: true, .. })
    }
}

/// A stored user profile.
///
/// `plugin_extras` is a free-form mapping extensions may use for their own
/// per-user state. It is only populated by `user_show` when explicitly
/// requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Login name.
    pub name: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    /// Site administrator flag.
    #[serde(default)]
    pub sysadmin: bool,
    /// Extension-owned metadata.
    #[serde(default)]
    pub plugin_extras: Option<Map<String, Value>>,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl UserProfile {
    /// Create a profile for a new regular user.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: None,
            fullname: None,
            sysadmin: false,
            plugin_extras: None,
            created_at: current_timestamp(),
        }
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Mark the user as a site administrator.
    pub fn with_sysadmin(mut self, sysadmin: bool) -> Self {
        self.sysadmin = sysadmin;
        self
    }

    /// Read a single plugin-extras entry.
    pub fn plugin_extra(&self, key: &str) -> Option<&Value> {
        self.plugin_extras.as_ref().and_then(|extras| extras.get(key))
    }

    /// Set a single plugin-extras entry, creating the mapping if needed.
    pub fn set_plugin_extra(&mut self, key: impl Into<String>, value: Value) {
        self.plugin_extras
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
    }

    /// The user this profile authenticates as.
    pub fn to_user(&self) -> User {
        User::Authenticated {
            id: self.id.clone(),
            name: self.name.clone(),
            sysadmin: self.sysadmin,
        }
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anonymous_user() {
        let user = User::anonymous();
        assert!(!user.is_authenticated());
        assert!(user.user_id().is_none());
        assert!(user.name().is_none());
        assert!(!user.is_sysadmin());
    }

    #[test]
    fn test_authenticated_user() {
        let user = User::authenticated(UserId::new("user_123"), "alice");
        assert!(user.is_authenticated());
        assert_eq!(user.name(), Some("alice"));
        assert_eq!(user.user_id().map(UserId::as_str), Some("user_123"));
        assert!(!user.is_sysadmin());
    }

    #[test]
    fn test_sysadmin_user() {
        let user = User::sysadmin(UserId::new("admin_1"), "admin");
        assert!(user.is_sysadmin());
    }

    #[test]
    fn test_user_id_generation_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_plugin_extras() {
        let mut profile = UserProfile::new("alice");
        assert!(profile.plugin_extras.is_none());
        assert!(profile.plugin_extra("k").is_none());

        profile.set_plugin_extra("k", json!({"a": 1}));
        assert_eq!(profile.plugin_extra("k"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_profile_to_user() {
        let profile = UserProfile::new("root").with_sysadmin(true);
        let user = profile.to_user();
        assert_eq!(user.name(), Some("root"));
        assert!(user.is_sysadmin());
        assert_eq!(user.user_id(), Some(&profile.id));
    }

    #[test]
    fn test_profile_deserializes_without_extras() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "u1",
            "name": "bob",
            "created_at": 0
        }))
        .unwrap();
        assert_eq!(profile.name, "bob");
        assert!(!profile.sysadmin);
        assert!(profile.plugin_extras.is_none());
    }
}
