//! Secret and configuration resolution
//!
//! Turns the process environment into a [`ConfigurationRecord`]. Resolution
//! never fails: missing secrets fall back to placeholders and are logged. The
//! caller decides through a [`SecretPolicy`] whether placeholders are acceptable.

use std::path::Path;

use thiserror::Error;
use web::{mask_secret, Config, ConfigValue, FrameworkError, ProcessEnv, ServerConfig, VarSource};

use super::gemini::{GeminiConfig, DEFAULT_GEMINI_KEY};
use super::session::{SessionConfig, DEFAULT_SESSION_SECRET};
use super::upload::{UploadConfig, DEFAULT_UPLOAD_FOLDER};

/// Where a secret value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Read from the environment (or a `.env` file)
    Env,
    /// Built-in placeholder
    BuiltIn,
}

/// How to treat secrets that fell back to their placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretPolicy {
    /// Accept placeholders; they were already logged
    #[default]
    Permissive,
    /// Reject placeholders
    Strict,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not set and strict mode rejects the built-in default")]
    MissingSecret { key: &'static str },
}

impl From<ConfigError> for FrameworkError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingSecret { key } => FrameworkError::config(key, err.to_string()),
        }
    }
}

/// Everything the application reads from its environment at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationRecord {
    pub gemini: GeminiConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
}

/// Resolve configuration from the process environment, relative to `.`
pub fn resolve() -> ConfigurationRecord {
    resolve_with(&ProcessEnv, Path::new("."))
}

/// Resolve configuration from `vars`, placing the upload folder under `project_root`
///
/// Creates the upload folder when it is missing. Calling this twice with the
/// same inputs yields equal records.
pub fn resolve_with(vars: &dyn VarSource, project_root: &Path) -> ConfigurationRecord {
    let gemini = match vars.var("GEMINI_KEY") {
        Some(api_key) => {
            tracing::info!(key = %mask_secret(&api_key), "GEMINI_KEY loaded");
            GeminiConfig {
                api_key,
                source: SecretSource::Env,
            }
        }
        None => {
            tracing::error!("GEMINI_KEY not found in environment; using built-in placeholder");
            GeminiConfig {
                api_key: DEFAULT_GEMINI_KEY.to_string(),
                source: SecretSource::BuiltIn,
            }
        }
    };

    let session = match vars.var("SESSION_SECRET") {
        Some(secret) => SessionConfig {
            secret,
            source: SecretSource::Env,
        },
        None => {
            tracing::warn!("SESSION_SECRET not set; sessions are signed with a built-in placeholder");
            SessionConfig {
                secret: DEFAULT_SESSION_SECRET.to_string(),
                source: SecretSource::BuiltIn,
            }
        }
    };

    let folder = vars
        .var("UPLOAD_FOLDER")
        .unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string());
    let upload = UploadConfig::new(project_root.join(folder));

    if let Err(err) = std::fs::create_dir_all(&upload.folder) {
        tracing::error!(
            folder = %upload.folder.display(),
            error = %err,
            "cannot create upload folder"
        );
    }

    ConfigurationRecord {
        gemini,
        session,
        upload,
    }
}

impl ConfigurationRecord {
    /// Check the record against a secret policy
    pub fn check(&self, policy: SecretPolicy) -> Result<(), ConfigError> {
        if policy == SecretPolicy::Permissive {
            return Ok(());
        }
        if self.gemini.source == SecretSource::BuiltIn {
            return Err(ConfigError::MissingSecret { key: "GEMINI_KEY" });
        }
        if self.session.source == SecretSource::BuiltIn {
            return Err(ConfigError::MissingSecret {
                key: "SESSION_SECRET",
            });
        }
        Ok(())
    }

    /// Write the record into the shared configuration store
    ///
    /// Registers the typed configs, sets the named keys and caps the server's
    /// request body size at the upload limit.
    pub fn apply(&self, config: &mut Config) {
        let key = ConfigValue::Secret(self.gemini.api_key.clone());
        config.set("GEMINI_API_KEY", key.clone());
        config.set("GEMINI_KEY", key);
        config.set("SECRET_KEY", ConfigValue::Secret(self.session.secret.clone()));
        config.set(
            "MAX_CONTENT_LENGTH",
            ConfigValue::Integer(self.upload.max_content_length),
        );
        config.set("UPLOAD_FOLDER", ConfigValue::Path(self.upload.folder.clone()));
        config.set(
            "ALLOWED_EXTENSIONS",
            ConfigValue::Set(self.upload.allowed_extensions.clone()),
        );

        let limit = self.upload.max_content_length as usize;
        let server = config.get::<ServerConfig>().unwrap_or_default();
        if server.max_body_size != limit
            && server.max_body_size != ServerConfig::default().max_body_size
        {
            tracing::warn!(
                configured = server.max_body_size,
                upload_limit = limit,
                "SERVER_MAX_BODY_SIZE overridden by the upload limit"
            );
        }
        config.register(server.to_builder().max_body_size(limit).build());

        config.register(self.gemini.clone());
        config.register(self.session.clone());
        config.register(self.upload.clone());
    }
}
