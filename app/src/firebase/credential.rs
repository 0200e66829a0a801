//! Service credential discovery
//!
//! A [`CredentialChain`] is an ordered list of places a credential may come
//! from. The first source that applies wins and later sources are never
//! consulted, even if loading the winner fails.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use web::VarSource;

use super::error::FirebaseError;
use crate::config::FirebaseConfig;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Path of the gcloud application default credentials, relative to `$HOME`
pub const GCLOUD_ADC_PATH: &str = ".config/gcloud/application_default_credentials.json";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// A Google service account key
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// A user credential created by `gcloud auth application-default login`
#[derive(Clone, Deserialize)]
pub struct AuthorizedUserKey {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

impl fmt::Debug for AuthorizedUserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUserKey")
            .field("client_id", &self.client_id)
            .field("quota_project_id", &self.quota_project_id)
            .finish_non_exhaustive()
    }
}

/// Contents of a credential JSON file, discriminated by its `type` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserKey),
}

impl KeyFile {
    /// Read and parse a credential file
    pub fn load(path: &Path) -> Result<Self, FirebaseError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FirebaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| FirebaseError::invalid(path, e.to_string()))
    }

    fn into_service_account(self, path: &Path) -> Result<ServiceAccountKey, FirebaseError> {
        match self {
            Self::ServiceAccount(key) => Ok(key),
            Self::AuthorizedUser(_) => Err(FirebaseError::invalid(
                path,
                "expected a service_account key, found authorized_user",
            )),
        }
    }
}

/// The credential selected for this process
#[derive(Debug, Clone)]
pub enum Credential {
    /// Key file next to the application
    LocalFile(ServiceAccountKey),
    /// Key file shipped with the deployment assets
    BundledAsset(ServiceAccountKey),
    /// Ambient credential found by the default lookup
    ApplicationDefault(KeyFile),
}

impl Credential {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LocalFile(_) => "local key file",
            Self::BundledAsset(_) => "bundled key file",
            Self::ApplicationDefault(_) => "application default",
        }
    }

    /// Project the credential belongs to, when it says so
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::LocalFile(key)
            | Self::BundledAsset(key)
            | Self::ApplicationDefault(KeyFile::ServiceAccount(key)) => key.project_id.as_deref(),
            Self::ApplicationDefault(KeyFile::AuthorizedUser(key)) => {
                key.quota_project_id.as_deref()
            }
        }
    }
}

/// One place a credential may be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    LocalFile(PathBuf),
    BundledAsset(PathBuf),
    ApplicationDefault,
}

impl CredentialSource {
    /// File sources apply when the file exists; the ambient chain always applies
    fn applies(&self) -> bool {
        match self {
            Self::LocalFile(path) | Self::BundledAsset(path) => path.is_file(),
            Self::ApplicationDefault => true,
        }
    }

    fn load(&self, vars: &dyn VarSource) -> Result<Credential, FirebaseError> {
        match self {
            Self::LocalFile(path) => Ok(Credential::LocalFile(
                KeyFile::load(path)?.into_service_account(path)?,
            )),
            Self::BundledAsset(path) => Ok(Credential::BundledAsset(
                KeyFile::load(path)?.into_service_account(path)?,
            )),
            Self::ApplicationDefault => {
                let path = ambient_key_path(vars)?;
                Ok(Credential::ApplicationDefault(KeyFile::load(&path)?))
            }
        }
    }
}

/// Locate the ambient credential file
///
/// `GOOGLE_APPLICATION_CREDENTIALS` wins when set, and must then point at a
/// readable file. Otherwise the gcloud default location under `$HOME` is used.
pub fn ambient_key_path(vars: &dyn VarSource) -> Result<PathBuf, FirebaseError> {
    if let Some(explicit) = vars.var("GOOGLE_APPLICATION_CREDENTIALS") {
        return Ok(PathBuf::from(explicit));
    }
    vars.var("HOME")
        .map(|home| Path::new(&home).join(GCLOUD_ADC_PATH))
        .filter(|path| path.is_file())
        .ok_or(FirebaseError::NoAmbientCredential)
}

/// Ordered credential sources, probed first-match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialChain {
    sources: Vec<CredentialSource>,
}

impl CredentialChain {
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self { sources }
    }

    /// Local key file, then bundled key file, then the ambient chain
    pub fn from_config(config: &FirebaseConfig) -> Self {
        Self::new(vec![
            CredentialSource::LocalFile(config.local_key_path.clone()),
            CredentialSource::BundledAsset(config.bundled_key_path.clone()),
            CredentialSource::ApplicationDefault,
        ])
    }

    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    /// The first source that applies
    pub fn select(&self) -> Option<&CredentialSource> {
        self.sources.iter().find(|source| source.applies())
    }

    /// Load the credential from the selected source
    pub fn resolve(&self, vars: &dyn VarSource) -> Result<Credential, FirebaseError> {
        let source = self.select().ok_or(FirebaseError::NoAmbientCredential)?;
        tracing::debug!(?source, "credential source selected");
        source.load(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firebase::testing::{authorized_user_json, service_account_json};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn chain(root: &Path) -> CredentialChain {
        let config = FirebaseConfig::from_vars(&vars(&[]), root);
        CredentialChain::from_config(&config)
    }

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_default_order() {
        let root = Path::new("/srv/lexai");
        assert_eq!(
            chain(root).sources(),
            &[
                CredentialSource::LocalFile(root.join("serviceAccountKey.json")),
                CredentialSource::BundledAsset(root.join("attached_assets/serviceAccountKey.json")),
                CredentialSource::ApplicationDefault,
            ]
        );
    }

    #[test]
    fn test_local_file_beats_bundled_asset() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("serviceAccountKey.json"),
            &service_account_json("local-project"),
        );
        write(
            &dir.path().join("attached_assets/serviceAccountKey.json"),
            &service_account_json("bundled-project"),
        );

        let credential = chain(dir.path()).resolve(&vars(&[])).unwrap();
        assert!(matches!(credential, Credential::LocalFile(_)));
        assert_eq!(credential.project_id(), Some("local-project"));
    }

    #[test]
    fn test_bundled_asset_used_without_local_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("attached_assets/serviceAccountKey.json"),
            &service_account_json("bundled-project"),
        );

        let credential = chain(dir.path()).resolve(&vars(&[])).unwrap();
        assert_eq!(credential.kind(), "bundled key file");
        assert_eq!(credential.project_id(), Some("bundled-project"));
    }

    #[test]
    fn test_no_fallback_after_first_match() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("serviceAccountKey.json"), "{ not json");
        write(
            &dir.path().join("attached_assets/serviceAccountKey.json"),
            &service_account_json("bundled-project"),
        );

        let err = chain(dir.path()).resolve(&vars(&[])).unwrap_err();
        assert!(matches!(err, FirebaseError::InvalidCredential { .. }));
    }

    #[test]
    fn test_ambient_credential_from_env_var() {
        let dir = tempfile::tempdir().unwrap();
        let adc = dir.path().join("adc.json");
        write(&adc, &authorized_user_json());

        let source = vars(&[("GOOGLE_APPLICATION_CREDENTIALS", adc.to_str().unwrap())]);
        let credential = chain(dir.path()).resolve(&source).unwrap();
        assert!(matches!(
            credential,
            Credential::ApplicationDefault(KeyFile::AuthorizedUser(_))
        ));
    }

    #[test]
    fn test_ambient_credential_from_gcloud_home() {
        let home = tempfile::tempdir().unwrap();
        write(
            &home.path().join(GCLOUD_ADC_PATH),
            &service_account_json("adc-project"),
        );
        let root = tempfile::tempdir().unwrap();

        let source = vars(&[("HOME", home.path().to_str().unwrap())]);
        let credential = chain(root.path()).resolve(&source).unwrap();
        assert_eq!(credential.kind(), "application default");
        assert_eq!(credential.project_id(), Some("adc-project"));
    }

    #[test]
    fn test_nothing_found_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();

        let source = vars(&[("HOME", home.path().to_str().unwrap())]);
        let err = chain(root.path()).resolve(&source).unwrap_err();
        assert!(matches!(err, FirebaseError::NoAmbientCredential));
    }

    #[test]
    fn test_certificate_sources_reject_user_credentials() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("serviceAccountKey.json"), &authorized_user_json());

        let err = chain(dir.path()).resolve(&vars(&[])).unwrap_err();
        assert!(err.to_string().contains("expected a service_account key"));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let key: KeyFile = serde_json::from_str(&service_account_json("p")).unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("BEGIN PRIVATE KEY"));
    }
}
