use std::collections::HashMap;
use std::path::Path;

use crate::error::FrameworkError;

/// Environment type enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Local,
    Development,
    Staging,
    Production,
    Testing,
    Custom(String),
}

impl Environment {
    /// Detect environment from APP_ENV or default to Local
    pub fn detect() -> Self {
        Self::detect_from(&ProcessEnv)
    }

    /// Detect environment from APP_ENV in the given variable source
    pub fn detect_from(vars: &dyn VarSource) -> Self {
        match vars.var("APP_ENV").as_deref() {
            Some("production") => Self::Production,
            Some("staging") => Self::Staging,
            Some("development") => Self::Development,
            Some("testing") => Self::Testing,
            Some("local") | None => Self::Local,
            Some(other) => Self::Custom(other.to_string()),
        }
    }

    /// Get the .env file suffix for this environment
    pub fn env_file_suffix(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_file_suffix())
    }
}

/// A source of named string variables
///
/// The process environment is the production source; tests hand in a map so
/// they never touch global state.
pub trait VarSource: Send + Sync {
    /// Look up a variable. Empty values count as absent.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Load environment variables from .env files with proper precedence
///
/// Precedence (later files override earlier):
/// 1. .env (base defaults)
/// 2. .env.local (local overrides, not committed)
/// 3. .env.{environment} (environment-specific)
/// 4. .env.{environment}.local (environment-specific local overrides)
/// 5. Actual system environment variables (highest priority)
pub fn load_dotenv(project_root: &Path) -> Environment {
    let env = Environment::detect();

    // dotenvy never overwrites, so the most specific file goes first
    let suffix = env.env_file_suffix();
    let _ = dotenvy::from_path(project_root.join(format!(".env.{}.local", suffix)));
    let _ = dotenvy::from_path(project_root.join(format!(".env.{}", suffix)));
    let _ = dotenvy::from_path(project_root.join(".env.local"));
    let _ = dotenvy::from_path(project_root.join(".env"));

    // APP_ENV may itself come from .env
    Environment::detect()
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use lexai_web::config::env;
///
/// let port: u16 = env("SERVER_PORT", 8080);
/// let host = env("SERVER_HOST", "127.0.0.1".to_string());
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_from(&ProcessEnv, key, default)
}

/// Same as [`env`], reading from an explicit source
pub fn env_from<T: std::str::FromStr>(vars: &dyn VarSource, key: &str, default: T) -> T {
    vars.var(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get a required environment variable
///
/// # Example
/// ```no_run
/// use lexai_web::config::env_required;
///
/// let secret: String = env_required("APP_SECRET").unwrap();
/// ```
pub fn env_required<T: std::str::FromStr>(key: &str) -> Result<T, FrameworkError> {
    let raw = ProcessEnv
        .var(key)
        .ok_or_else(|| FrameworkError::config(key, "not set"))?;
    raw.parse()
        .map_err(|_| FrameworkError::config(key, format!("cannot parse value '{}'", raw)))
}

/// Get an optional environment variable
///
/// # Example
/// ```
/// use lexai_web::config::env_optional;
///
/// let debug: Option<bool> = env_optional("APP_DEBUG");
/// ```
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    ProcessEnv.var(key).and_then(|v| v.parse().ok())
}
