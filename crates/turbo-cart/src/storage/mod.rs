//! Cart storage strategies.
//!
//! - [`CacheStorage`]: Key-Value store, one entry per cart
//! - [`SessionStorage`]: the platform session (or a request-scoped stand-in)
//! - [`ProfileStorage`]: the `plugin_extras` of a user profile

mod cache;
mod profile;
mod session;

pub use cache::{decode_content, encode_content, CacheStorage, FORMAT_VERSION};
pub use profile::ProfileStorage;
pub use session::SessionStorage;

use serde_json::Value;

use crate::context::{RequestContext, Scope};
use crate::error::CartError;
use crate::item::Content;

/// Persistence capability behind a [`Cart`](crate::Cart).
///
/// `identity` is the value [`identify`](Self::identify) produced; `key`
/// names one of possibly several carts under that identity.
pub trait CartStorage {
    /// Short strategy name, for logs.
    fn name(&self) -> &'static str;

    /// Resolve the cart identity for this request.
    fn identify(
        &self,
        scope: &Scope,
        ctx: &RequestContext,
        _data: &Value,
    ) -> Result<String, CartError> {
        Ok(default_identity(scope, ctx))
    }

    /// Load persisted content; nothing persisted is empty content.
    fn restore(
        &self,
        ctx: &mut RequestContext,
        identity: &str,
        key: &str,
    ) -> Result<Content, CartError>;

    /// Persist `content`.
    fn save(
        &self,
        ctx: &mut RequestContext,
        identity: &str,
        key: &str,
        content: &Content,
    ) -> Result<(), CartError>;

    /// Remove the persisted copy. Backs [`Cart::drop`](crate::Cart::drop).
    fn discard(&self, ctx: &mut RequestContext, identity: &str, key: &str)
        -> Result<(), CartError>;
}

/// Platform user id, or the session id (empty without a session) for the
/// `session` scope.
pub fn default_identity(scope: &Scope, ctx: &RequestContext) -> String {
    match scope {
        Scope::Session => ctx.session_id().to_string(),
        Scope::Named(_) => ctx.user_id().to_string(),
    }
}

/// Decode content held as a JSON value; null and `{}` are empty.
pub(crate) fn content_from_value(value: Option<&Value>) -> Result<Content, CartError> {
    match value {
        None | Some(Value::Null) => Ok(Content::new()),
        Some(value) => Ok(serde_json::from_value(value.clone())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use turbo_auth::{User, UserId};
    use turbo_cache::{Session, SessionId};

    #[test]
    fn test_default_identity_named_scope_uses_user_id() {
        let ctx = RequestContext::new(User::authenticated(UserId::new("u-1"), "alice"))
            .with_session(Session::new(SessionId::new("s-1")));
        assert_eq!(default_identity(&Scope::from("user"), &ctx), "u-1");
    }

    #[test]
    fn test_default_identity_session_scope_uses_session_id() {
        let ctx = RequestContext::new(User::authenticated(UserId::new("u-1"), "alice"))
            .with_session(Session::new(SessionId::new("s-1")));
        assert_eq!(default_identity(&Scope::Session, &ctx), "s-1");
    }

    #[test]
    fn test_default_identity_empty_fallbacks() {
        let ctx = RequestContext::new(User::anonymous());
        assert_eq!(default_identity(&Scope::Session, &ctx), "");
        assert_eq!(default_identity(&Scope::from("user"), &ctx), "");
    }

    #[test]
    fn test_content_from_value() {
        assert!(content_from_value(None).unwrap().is_empty());
        assert!(content_from_value(Some(&Value::Null)).unwrap().is_empty());
        assert!(content_from_value(Some(&json!({}))).unwrap().is_empty());

        let content = content_from_value(Some(&json!({"w": {"qty": 1}}))).unwrap();
        assert_eq!(content["w"]["qty"], json!(1));

        assert!(content_from_value(Some(&json!([1, 2]))).is_err());
    }
}
