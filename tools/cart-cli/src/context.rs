//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use turbo_auth::{ActionContext, KvUserDirectory, User, UserDirectory};
use turbo_cache::{Cache, FileStore, SessionId, SessionStore};
use turbo_cart::{CartConfig, CartFactory, RequestContext};

use crate::output::Output;

/// Who a command runs as.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    /// Username, anonymous when `None`.
    pub user: Option<String>,
    /// Session to resume.
    pub session: Option<String>,
}

/// Execution context for CLI commands.
pub struct Context {
    /// Cart configuration.
    pub config: CartConfig,
    /// Output handler.
    pub output: Output,
    /// Cart factory over the state file.
    pub factory: CartFactory,
    /// Registered users.
    pub users: Arc<KvUserDirectory>,
    sessions: SessionStore,
}

impl Context {
    /// Load context from a config file and open the state file.
    pub fn load(config_path: Option<&str>, state: &Path, output: Output) -> Result<Self> {
        let config = match config_path {
            Some(path) => CartConfig::load(path)?,
            None => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                Self::find_config(&cwd)?.unwrap_or_default()
            }
        }
        .with_env_overrides();

        let store = FileStore::open(state)
            .with_context(|| format!("Failed to open state file {}", state.display()))?;
        output.debug(&format!("state: {}", store.path().display()));

        Ok(Self::with_cache(config, Cache::new(Arc::new(store)), output))
    }

    /// Build the context over an already opened cache.
    pub fn with_cache(config: CartConfig, cache: Cache, output: Output) -> Self {
        let users = Arc::new(KvUserDirectory::new(cache.clone(), config.site_id.clone()));
        let factory = CartFactory::new(config.clone())
            .with_cache(cache.clone())
            .with_users(users.clone());

        Self {
            config,
            output,
            factory,
            users,
            sessions: SessionStore::new(cache),
        }
    }

    /// Find config file in directory tree.
    ///
    /// The nearest config file wins; one that fails to load is an error.
    fn find_config(start: &Path) -> Result<Option<CartConfig>> {
        let config_names = ["turbo-cart.toml", ".turbo-cart.toml"];

        let mut current = PathBuf::from(start);
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    let config = CartConfig::load(&config_path)
                        .with_context(|| format!("Failed to load {}", config_path.display()))?;
                    return Ok(Some(config));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Start a request for `caller`, resuming or creating its session.
    pub fn request(&self, caller: &Caller) -> Result<RequestContext> {
        let user = match &caller.user {
            Some(name) => self
                .users
                .user_show(&ActionContext::privileged(&self.config.site_id), name, false)
                .with_context(|| format!("Unknown user {}", name))?
                .to_user(),
            None => User::anonymous(),
        };

        let session = self
            .sessions
            .load_or_create(caller.session.clone().map(SessionId::from))?;
        self.output.debug(&format!("session: {}", session.id));

        Ok(RequestContext::new(user).with_session(session))
    }

    /// Persist the request's session.
    pub fn finish(&self, request: RequestContext) -> Result<()> {
        if let Some(mut session) = request.into_session() {
            self.sessions.save(&mut session)?;
            self.output.kv("session", session.id.as_str());
        }
        Ok(())
    }
}
