//! User-profile backed carts.
//!
//! Carts live in the target user's `plugin_extras` under
//! `shopping_cart__<key>`. Every save rewrites the whole profile, so two
//! requests saving carts for the same user concurrently can lose one
//! update.

use std::sync::Arc;

use serde_json::Value;
use turbo_auth::{ActionContext, UserDirectory, UserProfile};

use super::CartStorage;
use crate::config::ProfileAccess;
use crate::context::{RequestContext, Scope};
use crate::error::CartError;
use crate::item::Content;

/// Carts stored in user profiles, addressed by username.
pub struct ProfileStorage {
    users: Arc<dyn UserDirectory>,
    admin: ActionContext,
    access: ProfileAccess,
}

impl ProfileStorage {
    /// Create a profile-backed strategy.
    ///
    /// Resolves the site user once; all profile reads and writes run with
    /// its privileges.
    pub fn new(users: Arc<dyn UserDirectory>, access: ProfileAccess) -> Result<Self, CartError> {
        let site_user = users.site_user()?;
        Ok(Self {
            users,
            admin: ActionContext::privileged(site_user.name),
            access,
        })
    }

    /// Name of the profile a request for `target`'s cart actually reads.
    ///
    /// Callers get their own profile unless they are `target` or a
    /// sysadmin.
    pub fn effective_user(&self, ctx: &RequestContext, target: &str) -> Result<String, CartError> {
        let caller = ctx.user.name().ok_or(CartError::NotAuthenticated)?;
        if caller == target || ctx.user.is_sysadmin() {
            return Ok(target.to_string());
        }

        match self.access {
            ProfileAccess::Fallback => {
                tracing::warn!(caller, target, "cart access to another user denied, serving caller's own cart");
                Ok(caller.to_string())
            }
            ProfileAccess::Reject => Err(CartError::Forbidden {
                actor: caller.to_string(),
                target: target.to_string(),
            }),
        }
    }

    fn get_user(&self, ctx: &RequestContext, target: &str) -> Result<UserProfile, CartError> {
        let name = self.effective_user(ctx, target)?;
        Ok(self.users.user_show(&self.admin, &name, true)?)
    }
}

fn cart_key(key: &str) -> String {
    format!("shopping_cart__{}", key)
}

impl CartStorage for ProfileStorage {
    fn name(&self) -> &'static str {
        "user_plugin_extras"
    }

    fn identify(
        &self,
        _scope: &Scope,
        _ctx: &RequestContext,
        data: &Value,
    ) -> Result<String, CartError> {
        data.pointer("/__extras/username")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(CartError::MissingUsername)
    }

    fn restore(
        &self,
        ctx: &mut RequestContext,
        identity: &str,
        key: &str,
    ) -> Result<Content, CartError> {
        let user = self.get_user(ctx, identity)?;
        super::content_from_value(user.plugin_extra(&cart_key(key)))
    }

    fn save(
        &self,
        ctx: &mut RequestContext,
        identity: &str,
        key: &str,
        content: &Content,
    ) -> Result<(), CartError> {
        let mut user = self.get_user(ctx, identity)?;
        user.set_plugin_extra(cart_key(key), serde_json::to_value(content)?);
        tracing::debug!(user = %user.name, key, "writing cart into profile");
        self.users.user_update(&self.admin, user)?;
        Ok(())
    }

    fn discard(
        &self,
        ctx: &mut RequestContext,
        identity: &str,
        key: &str,
    ) -> Result<(), CartError> {
        self.save(ctx, identity, key, &Content::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use turbo_auth::{KvUserDirectory, User};
    use turbo_cache::{Cache, MemoryStore};

    struct Fixture {
        users: Arc<KvUserDirectory>,
        alice: User,
        bob: User,
        root: User,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(KvUserDirectory::new(
            Cache::new(Arc::new(MemoryStore::new())),
            "site",
        ));
        let alice = users.user_create(UserProfile::new("alice")).unwrap().to_user();
        let bob = users.user_create(UserProfile::new("bob")).unwrap().to_user();
        let root = users
            .user_create(UserProfile::new("root").with_sysadmin(true))
            .unwrap()
            .to_user();
        Fixture {
            users,
            alice,
            bob,
            root,
        }
    }

    fn storage(f: &Fixture, access: ProfileAccess) -> ProfileStorage {
        ProfileStorage::new(f.users.clone(), access).unwrap()
    }

    fn content(value: Value) -> Content {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_identify_reads_username_from_extras() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);
        let ctx = RequestContext::new(f.bob.clone());
        let data = json!({"__extras": {"username": "alice"}});

        let id = storage.identify(&Scope::Session, &ctx, &data).unwrap();
        assert_eq!(id, "alice");
    }

    #[test]
    fn test_identify_without_username_fails() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);
        let ctx = RequestContext::new(f.alice.clone());

        for data in [json!({}), json!({"__extras": {}}), json!({"__extras": {"username": 5}})] {
            let result = storage.identify(&Scope::Session, &ctx, &data);
            assert!(matches!(result, Err(CartError::MissingUsername)));
        }
    }

    #[test]
    fn test_effective_user_rules() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);

        let own = RequestContext::new(f.alice.clone());
        assert_eq!(storage.effective_user(&own, "alice").unwrap(), "alice");

        let other = RequestContext::new(f.bob.clone());
        assert_eq!(storage.effective_user(&other, "alice").unwrap(), "bob");

        let admin = RequestContext::new(f.root.clone());
        assert_eq!(storage.effective_user(&admin, "alice").unwrap(), "alice");

        let anon = RequestContext::new(User::anonymous());
        assert!(matches!(
            storage.effective_user(&anon, "alice"),
            Err(CartError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_reject_policy() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Reject);
        let ctx = RequestContext::new(f.bob.clone());

        let result = storage.effective_user(&ctx, "alice");
        assert!(matches!(result, Err(CartError::Forbidden { .. })));
    }

    #[test]
    fn test_save_writes_into_plugin_extras() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);
        let mut ctx = RequestContext::new(f.alice.clone());

        storage
            .save(&mut ctx, "alice", "default", &content(json!({"w": {"qty": 2}})))
            .unwrap();

        let profile = f
            .users
            .user_show(&ActionContext::privileged("site"), "alice", true)
            .unwrap();
        assert_eq!(
            profile.plugin_extra("shopping_cart__default"),
            Some(&json!({"w": {"qty": 2}}))
        );
    }

    #[test]
    fn test_save_keeps_other_extras_and_carts() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);
        let mut ctx = RequestContext::new(f.alice.clone());

        let mut profile = f
            .users
            .user_show(&ActionContext::privileged("site"), "alice", true)
            .unwrap();
        profile.set_plugin_extra("theme", json!("dark"));
        f.users
            .user_update(&ActionContext::privileged("site"), profile)
            .unwrap();

        storage
            .save(&mut ctx, "alice", "a", &content(json!({"x": {}})))
            .unwrap();
        storage
            .save(&mut ctx, "alice", "b", &content(json!({"y": {}})))
            .unwrap();

        let profile = f
            .users
            .user_show(&ActionContext::privileged("site"), "alice", true)
            .unwrap();
        assert_eq!(profile.plugin_extra("theme"), Some(&json!("dark")));
        assert_eq!(storage.restore(&mut ctx, "alice", "a").unwrap().len(), 1);
        assert_eq!(storage.restore(&mut ctx, "alice", "b").unwrap().len(), 1);
    }

    #[test]
    fn test_discard_persists_empty_cart() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);
        let mut ctx = RequestContext::new(f.alice.clone());

        storage
            .save(&mut ctx, "alice", "default", &content(json!({"w": {}})))
            .unwrap();
        storage.discard(&mut ctx, "alice", "default").unwrap();

        let profile = f
            .users
            .user_show(&ActionContext::privileged("site"), "alice", true)
            .unwrap();
        assert_eq!(profile.plugin_extra("shopping_cart__default"), Some(&json!({})));
        assert!(storage.restore(&mut ctx, "alice", "default").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_target_user_fails() {
        let f = fixture();
        let storage = storage(&f, ProfileAccess::Fallback);
        let mut ctx = RequestContext::new(f.root.clone());

        let result = storage.restore(&mut ctx, "ghost", "default");
        assert!(matches!(result, Err(CartError::Auth(_))));
    }
}
