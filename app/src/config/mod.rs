mod firebase;
mod gemini;
mod resolver;
mod session;
mod upload;

pub use firebase::{
    FirebaseConfig, BUNDLED_KEY_FILE, DEFAULT_DATABASE_URL, DEFAULT_PROJECT_ID,
    DEFAULT_STORAGE_BUCKET, LOCAL_KEY_FILE,
};
pub use gemini::{GeminiConfig, DEFAULT_GEMINI_KEY};
pub use resolver::{
    resolve, resolve_with, ConfigError, ConfigurationRecord, SecretPolicy, SecretSource,
};
pub use session::{SessionConfig, DEFAULT_SESSION_SECRET};
pub use upload::{UploadConfig, ALLOWED_EXTENSIONS, DEFAULT_UPLOAD_FOLDER, MAX_CONTENT_LENGTH};

use web::{Config, FrameworkError, ProcessEnv, VarSource};

/// Register all application configs
///
/// Production runs reject placeholder secrets; every other environment
/// accepts them with a logged warning.
pub fn register_all(config: &mut Config) -> Result<(), FrameworkError> {
    register_with(config, &ProcessEnv)
}

/// Same as [`register_all`], reading from an explicit variable source
pub fn register_with(config: &mut Config, vars: &dyn VarSource) -> Result<(), FrameworkError> {
    let policy = if config.is_production() {
        SecretPolicy::Strict
    } else {
        SecretPolicy::Permissive
    };
    let root = config.project_root().to_path_buf();

    let record = resolve_with(vars, &root);
    record.check(policy)?;
    record.apply(config);

    config.register(FirebaseConfig::from_vars(vars, &root));
    Ok(())
}
