//! Per-request context passed explicitly to cart operations.

use serde_json::{Map, Value};
use std::fmt;
use turbo_auth::User;
use turbo_cache::Session;

/// Cart scope requested by the caller.
///
/// Only [`Scope::Session`] changes identity resolution; any other name is
/// carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Carts keyed by the current session.
    Session,
    /// Any other scope name, e.g. `"user"`.
    Named(String),
}

impl Scope {
    /// The scope name.
    pub fn as_str(&self) -> &str {
        match self {
            Scope::Session => "session",
            Scope::Named(name) => name,
        }
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        match s {
            "session" => Scope::Session,
            other => Scope::Named(other.to_string()),
        }
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Scope::from(s.as_str())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a cart needs to know about the current request.
///
/// Owns the platform session for the duration of the request (if any) and
/// a request-scoped scratch namespace used when there is no session.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The requesting user.
    pub user: User,
    session: Option<Session>,
    scratch: Map<String, Value>,
}

impl RequestContext {
    /// Create a context for `user` without a session.
    pub fn new(user: User) -> Self {
        Self {
            user,
            session: None,
            scratch: Map::new(),
        }
    }

    /// Attach the platform session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Platform user id of the requester, empty when anonymous.
    pub fn user_id(&self) -> &str {
        self.user.user_id().map(|id| id.as_str()).unwrap_or_default()
    }

    /// Current session id, empty when there is no session.
    pub fn session_id(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.id.as_str())
            .unwrap_or_default()
    }

    /// The platform session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Mutable access to the platform session, if any.
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Hand the (possibly modified) session back to the session layer.
    pub fn into_session(self) -> Option<Session> {
        self.session
    }

    /// The request-scoped namespace.
    pub fn scratch(&self) -> &Map<String, Value> {
        &self.scratch
    }

    /// Session data when `prefer_session` is set and a session exists,
    /// otherwise the request-scoped namespace.
    pub(crate) fn session_data_or_scratch(
        &mut self,
        prefer_session: bool,
    ) -> &mut Map<String, Value> {
        match (&mut self.session, prefer_session) {
            (Some(session), true) => &mut session.data,
            _ => &mut self.scratch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_auth::UserId;
    use turbo_cache::SessionId;

    #[test]
    fn test_scope_parsing() {
        assert_eq!(Scope::from("session"), Scope::Session);
        assert_eq!(Scope::from("user"), Scope::Named("user".to_string()));
        assert_eq!(Scope::from("user").as_str(), "user");
        assert_eq!(Scope::Session.to_string(), "session");
    }

    #[test]
    fn test_anonymous_without_session() {
        let ctx = RequestContext::new(User::anonymous());
        assert_eq!(ctx.user_id(), "");
        assert_eq!(ctx.session_id(), "");
        assert!(ctx.session().is_none());
    }

    #[test]
    fn test_user_and_session_ids() {
        let ctx = RequestContext::new(User::authenticated(UserId::new("u-1"), "alice"))
            .with_session(Session::new(SessionId::new("s-1")));
        assert_eq!(ctx.user_id(), "u-1");
        assert_eq!(ctx.session_id(), "s-1");
        assert_eq!(ctx.into_session().map(|s| s.id), Some(SessionId::new("s-1")));
    }
}
