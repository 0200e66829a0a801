use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

/// A value stored under a named configuration key
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    Secret(String),
    Integer(u64),
    Flag(bool),
    Path(PathBuf),
    Set(BTreeSet<String>),
}

impl ConfigValue {
    /// Borrow the string content of a text or secret value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Secret(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Render the value for display, masking secrets after five characters
    pub fn redacted(&self) -> String {
        match self {
            Self::Secret(s) => mask_secret(s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Secret(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Flag(b) => write!(f, "{}", b),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Set(set) => {
                let items: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

/// Show the first five characters of a secret followed by an ellipsis
///
/// Secrets of five characters or fewer are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 5 {
        return "*****".to_string();
    }
    let prefix: String = secret.chars().take(5).collect();
    format!("{}...", prefix)
}

/// Repository for storing configuration
///
/// Holds typed configuration structs keyed by type, plus flat named values for
/// code that looks settings up by key.
pub struct ConfigRepository {
    configs: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    values: BTreeMap<String, ConfigValue>,
}

impl ConfigRepository {
    /// Create a new empty config repository
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
            values: BTreeMap::new(),
        }
    }

    /// Register a config struct in the repository
    pub fn register<T: Any + Send + Sync + 'static>(&mut self, config: T) {
        self.configs.insert(TypeId::of::<T>(), Box::new(config));
    }

    /// Get a config struct by type
    pub fn get<T: Any + Send + Sync + Clone + 'static>(&self) -> Option<T> {
        self.borrow::<T>().cloned()
    }

    /// Borrow a config struct by type without cloning
    pub fn borrow<T: Any + Send + Sync + 'static>(&self) -> Option<&T> {
        self.configs
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Check if a config type is registered
    pub fn has<T: Any + 'static>(&self) -> bool {
        self.configs.contains_key(&TypeId::of::<T>())
    }

    /// Store a named value, replacing any previous value under the key
    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    /// Look up a named value
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// All named values in key order
    pub fn values(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for ConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}
