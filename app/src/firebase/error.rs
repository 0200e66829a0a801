use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while opening or using the Firebase backend
#[derive(Debug, Error)]
pub enum FirebaseError {
    #[error("cannot read credential file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credential in {}: {message}", path.display())]
    InvalidCredential { path: PathBuf, message: String },

    #[error("no ambient credential found (set GOOGLE_APPLICATION_CREDENTIALS or run `gcloud auth application-default login`)")]
    NoAmbientCredential,

    #[error("cannot sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("initialization did not finish within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl FirebaseError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            path: path.into(),
            message: message.into(),
        }
    }
}
