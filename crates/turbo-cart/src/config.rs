//! Cart configuration.
//!
//! Loaded from TOML (or JSON, by file extension); every field has a default
//! so an empty file is a valid session-backed configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::factory::StrategyKind;

/// Environment variable overriding [`CartConfig::factory`].
pub const ENV_FACTORY: &str = "TURBO_CART_FACTORY";

/// Environment variable overriding [`CartConfig::site_id`].
pub const ENV_SITE_ID: &str = "TURBO_CART_SITE_ID";

/// Storage strategy used when none is configured.
pub const DEFAULT_FACTORY: &str = "session";

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage strategy name: `redis`, `session` or `user_plugin_extras`.
    #[serde(default = "default_factory")]
    pub factory: String,

    /// Site identifier, part of cache keys and the site user's name.
    #[serde(default = "default_site_id")]
    pub site_id: String,

    /// What to do when a user asks for someone else's profile cart.
    #[serde(default)]
    pub profile_access: ProfileAccess,

    /// Cache key layout.
    #[serde(default)]
    pub cache: CacheKeyspace,
}

fn default_factory() -> String {
    DEFAULT_FACTORY.to_string()
}

fn default_site_id() -> String {
    "default".to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            factory: default_factory(),
            site_id: default_site_id(),
            profile_access: ProfileAccess::default(),
            cache: CacheKeyspace::default(),
        }
    }
}

impl CartConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| {
                CartError::Config(format!("failed to parse JSON config {}: {}", path.display(), e))
            })
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, CartError> {
        toml::from_str(content).map_err(|e| CartError::Config(e.to_string()))
    }

    /// Apply `TURBO_CART_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(factory) = lookup(ENV_FACTORY).filter(|v| !v.is_empty()) {
            self.factory = factory;
        }
        if let Some(site_id) = lookup(ENV_SITE_ID).filter(|v| !v.is_empty()) {
            self.site_id = site_id;
        }
        self
    }

    /// Resolve the configured storage strategy.
    pub fn strategy(&self) -> Result<StrategyKind, CartError> {
        self.factory.parse()
    }
}

/// Policy for a profile cart lookup that targets another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileAccess {
    /// Serve the caller's own cart instead.
    #[default]
    Fallback,
    /// Fail with [`CartError::Forbidden`].
    Reject,
}

/// Segments of the cache-backed key
/// `<namespace>:<site-id>:<extension>:<cart-type>:<identity>:<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKeyspace {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_cart_type")]
    pub cart_type: String,
}

fn default_namespace() -> String {
    "turbo".to_string()
}

fn default_extension() -> String {
    "turbo_cart".to_string()
}

fn default_cart_type() -> String {
    "shopping_cart".to_string()
}

impl Default for CacheKeyspace {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            extension: default_extension(),
            cart_type: default_cart_type(),
        }
    }
}
