//! Strategy selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use turbo_auth::UserDirectory;
use turbo_cache::Cache;

use crate::cart::Cart;
use crate::config::CartConfig;
use crate::context::{RequestContext, Scope};
use crate::error::CartError;
use crate::storage::{CacheStorage, CartStorage, ProfileStorage, SessionStorage};

/// The registered storage strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Key-Value store (`redis`).
    Redis,
    /// Platform session (`session`).
    Session,
    /// User profile plugin extras (`user_plugin_extras`).
    UserPluginExtras,
}

impl StrategyKind {
    /// All registered strategies.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Redis,
        StrategyKind::Session,
        StrategyKind::UserPluginExtras,
    ];

    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Redis => "redis",
            StrategyKind::Session => "session",
            StrategyKind::UserPluginExtras => "user_plugin_extras",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CartError::UnknownStrategy(s.to_string()))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds carts with the configured storage strategy.
///
/// # Example
///
/// ```rust,ignore
/// let factory = CartFactory::new(config).with_cache(cache).with_users(users);
///
/// let mut cart = factory.get_cart("session", &ctx, json!({}))?;
/// cart.restore(&mut ctx, "default")?;
/// cart.add("widget", details);
/// cart.save(&mut ctx, "default")?;
/// ```
#[derive(Clone)]
pub struct CartFactory {
    config: CartConfig,
    cache: Option<Cache>,
    users: Option<Arc<dyn UserDirectory>>,
}

impl CartFactory {
    /// Create a factory without any backend connections.
    pub fn new(config: CartConfig) -> Self {
        Self {
            config,
            cache: None,
            users: None,
        }
    }

    /// Provide the Key-Value connection used by the `redis` strategy.
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Provide the user actions used by the `user_plugin_extras` strategy.
    pub fn with_users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Construct the configured storage strategy.
    pub fn storage(&self) -> Result<Box<dyn CartStorage>, CartError> {
        let kind = self.config.strategy()?;
        let storage: Box<dyn CartStorage> = match kind {
            StrategyKind::Redis => {
                let cache = self.cache.clone().ok_or_else(|| {
                    CartError::Config("the redis strategy needs a cache connection".to_string())
                })?;
                Box::new(CacheStorage::new(
                    cache,
                    self.config.site_id.clone(),
                    self.config.cache.clone(),
                ))
            }
            StrategyKind::Session => Box::new(SessionStorage::platform()),
            StrategyKind::UserPluginExtras => {
                let users = self.users.clone().ok_or_else(|| {
                    CartError::Config(
                        "the user_plugin_extras strategy needs a user directory".to_string(),
                    )
                })?;
                Box::new(ProfileStorage::new(users, self.config.profile_access)?)
            }
        };
        Ok(storage)
    }

    /// Get an identified, empty cart for this request.
    ///
    /// Content is not loaded; call [`Cart::restore`] for that.
    pub fn get_cart(
        &self,
        scope: impl Into<Scope>,
        ctx: &RequestContext,
        data: Value,
    ) -> Result<Cart, CartError> {
        let scope = scope.into();
        let mut cart = Cart::new(self.storage()?).with_data(data);
        cart.identify(&scope, ctx)?;
        tracing::info!(strategy = cart.strategy(), scope = %scope, "cart ready");
        Ok(cart)
    }
}

impl fmt::Debug for CartFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartFactory")
            .field("config", &self.config)
            .field("cache", &self.cache.is_some())
            .field("users", &self.users.is_some())
            .finish()
    }
}
