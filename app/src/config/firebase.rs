use std::path::{Path, PathBuf};
use std::time::Duration;

use web::{env_from, VarSource};

pub const DEFAULT_PROJECT_ID: &str = "lexai-1e745";
pub const DEFAULT_STORAGE_BUCKET: &str = "lexai-1e745.firebasestorage.app";
pub const DEFAULT_DATABASE_URL: &str =
    "https://lexai-1e745-default-rtdb.asia-southeast1.firebasedatabase.app";

/// Service account key checked first, relative to the project root
pub const LOCAL_KEY_FILE: &str = "serviceAccountKey.json";
/// Service account key shipped with the deployment assets
pub const BUNDLED_KEY_FILE: &str = "attached_assets/serviceAccountKey.json";

/// Firebase backend configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub storage_bucket: String,
    pub database_url: String,
    pub local_key_path: PathBuf,
    pub bundled_key_path: PathBuf,
    /// Upper bound for the whole initialization sequence
    pub init_timeout: Duration,
}

impl FirebaseConfig {
    /// Build config from the given variable source
    pub fn from_vars(vars: &dyn VarSource, project_root: &Path) -> Self {
        Self {
            project_id: env_from(vars, "FIREBASE_PROJECT_ID", DEFAULT_PROJECT_ID.to_string()),
            storage_bucket: env_from(
                vars,
                "FIREBASE_STORAGE_BUCKET",
                DEFAULT_STORAGE_BUCKET.to_string(),
            ),
            database_url: env_from(vars, "FIREBASE_DATABASE_URL", DEFAULT_DATABASE_URL.to_string()),
            local_key_path: project_root.join(LOCAL_KEY_FILE),
            bundled_key_path: project_root.join(BUNDLED_KEY_FILE),
            init_timeout: Duration::from_secs(env_from(vars, "FIREBASE_INIT_TIMEOUT_SECS", 15)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_and_overrides() {
        let config = FirebaseConfig::from_vars(&HashMap::new(), Path::new("/srv/lexai"));
        assert_eq!(config.project_id, "lexai-1e745");
        assert_eq!(config.storage_bucket, "lexai-1e745.firebasestorage.app");
        assert_eq!(config.init_timeout, Duration::from_secs(15));
        assert_eq!(
            config.bundled_key_path,
            PathBuf::from("/srv/lexai/attached_assets/serviceAccountKey.json")
        );

        let vars: HashMap<String, String> = [
            ("FIREBASE_STORAGE_BUCKET", "staging-bucket"),
            ("FIREBASE_INIT_TIMEOUT_SECS", "3"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = FirebaseConfig::from_vars(&vars, Path::new("."));
        assert_eq!(config.storage_bucket, "staging-bucket");
        assert_eq!(config.init_timeout, Duration::from_secs(3));
    }
}
