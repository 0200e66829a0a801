//! Configuration module
//!
//! - Automatic `.env` file loading with environment-based precedence
//! - Type-safe configuration structs
//! - Flat named values for settings looked up by key
//!
//! The store is an ordinary value owned by the application. It is filled
//! during startup and then frozen into the shared [`crate::AppContext`].
//!
//! # Example
//!
//! ```rust,no_run
//! use lexai_web::{Config, ServerConfig};
//!
//! let config = Config::init(std::path::Path::new("."));
//! let server = config.get::<ServerConfig>().unwrap();
//! println!("Server port: {}", server.port);
//! ```

pub mod env;
pub mod providers;
pub mod repository;

pub use env::{
    env, env_from, env_optional, env_required, load_dotenv, Environment, ProcessEnv, VarSource,
};
pub use providers::{AppConfig, ServerConfig, ServerConfigBuilder};
pub use repository::{mask_secret, ConfigRepository, ConfigValue};

use std::any::Any;
use std::path::{Path, PathBuf};

/// The application's shared configuration store
pub struct Config {
    repository: ConfigRepository,
    project_root: PathBuf,
}

impl Config {
    /// Initialize the configuration system
    ///
    /// Loads `.env` files from `project_root`, then registers the default
    /// configs from the process environment.
    pub fn init(project_root: &Path) -> Self {
        env::load_dotenv(project_root);
        Self::from_vars(&ProcessEnv, project_root)
    }

    /// Build the default configs from an explicit variable source
    pub fn from_vars(vars: &dyn VarSource, project_root: &Path) -> Self {
        let app = AppConfig::from_vars(vars);
        let mut repository = ConfigRepository::new();
        repository.set("APP_ENV", ConfigValue::Text(app.environment.to_string()));
        repository.set("APP_DEBUG", ConfigValue::Flag(app.debug));
        repository.register(app);
        repository.register(ServerConfig::from_vars(vars));

        Self {
            repository,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Directory `.env` files were loaded from; relative paths resolve here
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get a typed config struct from the repository
    pub fn get<T: Any + Send + Sync + Clone + 'static>(&self) -> Option<T> {
        self.repository.get::<T>()
    }

    /// Borrow a typed config struct from the repository
    pub fn borrow<T: Any + Send + Sync + 'static>(&self) -> Option<&T> {
        self.repository.borrow::<T>()
    }

    /// Register a custom config struct, replacing any previous one of the type
    pub fn register<T: Any + Send + Sync + 'static>(&mut self, config: T) {
        self.repository.register(config);
    }

    /// Check if a config type is registered
    pub fn has<T: Any + 'static>(&self) -> bool {
        self.repository.has::<T>()
    }

    /// Store a named value
    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.repository.set(key, value);
    }

    /// Look up a named value
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.repository.value(key)
    }

    /// All named values in key order
    pub fn values(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.repository.values()
    }

    /// Get the current environment
    pub fn environment(&self) -> Environment {
        self.borrow::<AppConfig>()
            .map(|c| c.environment.clone())
            .unwrap_or_else(Environment::detect)
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment().is_production()
    }

    /// Check if debug mode is enabled
    pub fn is_debug(&self) -> bool {
        self.borrow::<AppConfig>().map(|c| c.debug).unwrap_or(true)
    }
}
