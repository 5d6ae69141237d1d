//! User lookup and update actions.

use crate::{AuthError, User, UserProfile};
use turbo_cache::{cache_key, Cache};

/// Who is performing a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    /// Login name of the acting user (empty when anonymous).
    pub user: String,
    /// Skip authorization checks entirely.
    pub ignore_auth: bool,
}

impl ActionContext {
    /// Context for an action performed on behalf of `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            user: user.name().unwrap_or_default().to_string(),
            ignore_auth: false,
        }
    }

    /// Privileged context that bypasses authorization.
    pub fn privileged(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ignore_auth: true,
        }
    }
}

/// The platform's user actions.
pub trait UserDirectory {
    /// Look up a user by name.
    ///
    /// `plugin_extras` is only filled in when `include_plugin_extras` is set
    /// and the context may see it (privileged, sysadmin, or the user
    /// themself); otherwise it is `None`.
    fn user_show(
        &self,
        ctx: &ActionContext,
        name: &str,
        include_plugin_extras: bool,
    ) -> Result<UserProfile, AuthError>;

    /// Replace a stored profile.
    ///
    /// A profile with `plugin_extras: None` keeps the stored extras.
    fn user_update(&self, ctx: &ActionContext, profile: UserProfile)
        -> Result<UserProfile, AuthError>;

    /// The site's own administrator account, created on first use.
    fn site_user(&self) -> Result<UserProfile, AuthError>;
}

/// [`UserDirectory`] storing profiles in the Key-Value store under
/// `user:<name>`.
#[derive(Debug, Clone)]
pub struct KvUserDirectory {
    cache: Cache,
    site_id: String,
}

impl KvUserDirectory {
    /// Create a directory over `cache`; `site_id` names the site user.
    pub fn new(cache: Cache, site_id: impl Into<String>) -> Self {
        Self {
            cache,
            site_id: site_id.into(),
        }
    }

    /// Register a new user.
    pub fn user_create(&self, profile: UserProfile) -> Result<UserProfile, AuthError> {
        let key = user_key(&profile.name);
        if self.cache.exists(&key)? {
            return Err(AuthError::UserAlreadyExists(profile.name));
        }
        self.cache.set(&key, &profile)?;
        tracing::info!(user = %profile.name, sysadmin = profile.sysadmin, "user created");
        Ok(profile)
    }

    fn load(&self, name: &str) -> Result<Option<UserProfile>, AuthError> {
        Ok(self.cache.get::<UserProfile>(&user_key(name))?)
    }

    /// Whether `ctx` may act on `target`'s private data.
    fn authorized(&self, ctx: &ActionContext, target: &str) -> Result<bool, AuthError> {
        if ctx.ignore_auth || (!ctx.user.is_empty() && ctx.user == target) {
            return Ok(true);
        }
        if ctx.user.is_empty() {
            return Ok(false);
        }
        Ok(self.load(&ctx.user)?.map(|p| p.sysadmin).unwrap_or(false))
    }
}

impl UserDirectory for KvUserDirectory {
    fn user_show(
        &self,
        ctx: &ActionContext,
        name: &str,
        include_plugin_extras: bool,
    ) -> Result<UserProfile, AuthError> {
        let mut profile = self
            .load(name)?
            .ok_or_else(|| AuthError::UserNotFound(name.to_string()))?;

        if !include_plugin_extras || !self.authorized(ctx, name)? {
            profile.plugin_extras = None;
        }
        Ok(profile)
    }

    fn user_update(
        &self,
        ctx: &ActionContext,
        mut profile: UserProfile,
    ) -> Result<UserProfile, AuthError> {
        let stored = self
            .load(&profile.name)?
            .ok_or_else(|| AuthError::UserNotFound(profile.name.clone()))?;

        if !self.authorized(ctx, &profile.name)? {
            return Err(AuthError::InsufficientPermissions {
                user: ctx.user.clone(),
                action: format!("update user {}", profile.name),
            });
        }

        profile.id = stored.id;
        profile.created_at = stored.created_at;
        if profile.plugin_extras.is_none() {
            profile.plugin_extras = stored.plugin_extras;
        }
        self.cache.set(&user_key(&profile.name), &profile)?;
        tracing::debug!(user = %profile.name, by = %ctx.user, "user updated");
        Ok(profile)
    }

    fn site_user(&self) -> Result<UserProfile, AuthError> {
        if let Some(profile) = self.load(&self.site_id)? {
            return Ok(profile);
        }
        self.user_create(UserProfile::new(self.site_id.clone()).with_sysadmin(true))
    }
}

fn user_key(name: &str) -> String {
    cache_key!("user", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use turbo_cache::MemoryStore;

    fn directory() -> KvUserDirectory {
        let dir = KvUserDirectory::new(Cache::new(Arc::new(MemoryStore::new())), "default");
        dir.user_create(UserProfile::new("alice")).unwrap();
        dir.user_create(UserProfile::new("bob")).unwrap();
        dir.user_create(UserProfile::new("root").with_sysadmin(true))
            .unwrap();
        dir
    }

    fn with_extras(dir: &KvUserDirectory, name: &str) {
        let mut profile = dir
            .user_show(&ActionContext::privileged("default"), name, true)
            .unwrap();
        profile.set_plugin_extra("note", json!("secret"));
        dir.user_update(&ActionContext::privileged("default"), profile)
            .unwrap();
    }

    fn ctx(name: &str) -> ActionContext {
        ActionContext {
            user: name.to_string(),
            ignore_auth: false,
        }
    }

    #[test]
    fn test_create_duplicate_fails() {
        let dir = directory();
        let result = dir.user_create(UserProfile::new("alice"));
        assert!(matches!(result, Err(AuthError::UserAlreadyExists(_))));
    }

    #[test]
    fn test_show_unknown_user() {
        let dir = directory();
        let result = dir.user_show(&ctx("alice"), "carol", false);
        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[test]
    fn test_extras_visible_to_self_sysadmin_and_privileged() {
        let dir = directory();
        with_extras(&dir, "alice");

        for actor in [ctx("alice"), ctx("root"), ActionContext::privileged("x")] {
            let profile = dir.user_show(&actor, "alice", true).unwrap();
            assert_eq!(profile.plugin_extra("note"), Some(&json!("secret")));
        }
    }

    #[test]
    fn test_extras_hidden_from_other_users() {
        let dir = directory();
        with_extras(&dir, "alice");

        let profile = dir.user_show(&ctx("bob"), "alice", true).unwrap();
        assert!(profile.plugin_extras.is_none());
        let profile = dir.user_show(&ctx(""), "alice", true).unwrap();
        assert!(profile.plugin_extras.is_none());
    }

    #[test]
    fn test_extras_omitted_unless_requested() {
        let dir = directory();
        with_extras(&dir, "alice");

        let profile = dir.user_show(&ctx("alice"), "alice", false).unwrap();
        assert!(profile.plugin_extras.is_none());
    }

    #[test]
    fn test_update_requires_permission() {
        let dir = directory();
        let profile = dir.user_show(&ctx("bob"), "alice", false).unwrap();
        let result = dir.user_update(&ctx("bob"), profile);
        assert!(result.as_ref().unwrap_err().is_permission_error());
    }

    #[test]
    fn test_update_without_extras_keeps_stored_extras() {
        let dir = directory();
        with_extras(&dir, "alice");

        let mut profile = dir.user_show(&ctx("alice"), "alice", false).unwrap();
        profile.email = Some("alice@example.com".to_string());
        dir.user_update(&ctx("alice"), profile).unwrap();

        let reloaded = dir.user_show(&ctx("alice"), "alice", true).unwrap();
        assert_eq!(reloaded.email.as_deref(), Some("alice@example.com"));
        assert_eq!(reloaded.plugin_extra("note"), Some(&json!("secret")));
    }

    #[test]
    fn test_update_unknown_user() {
        let dir = directory();
        let result = dir.user_update(
            &ActionContext::privileged("default"),
            UserProfile::new("ghost"),
        );
        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[test]
    fn test_site_user_created_once() {
        let dir = directory();
        let first = dir.site_user().unwrap();
        let second = dir.site_user().unwrap();
        assert_eq!(first.name, "default");
        assert!(first.sysadmin);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_action_context_for_user() {
        let anon = ActionContext::for_user(&User::anonymous());
        assert_eq!(anon.user, "");
        assert!(!anon.ignore_auth);

        let alice = ActionContext::for_user(&User::authenticated("u1".into(), "alice"));
        assert_eq!(alice.user, "alice");
    }
}
