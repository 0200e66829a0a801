//! OAuth2 token exchange with Google
//!
//! Service account keys sign a JWT bearer assertion; authorized-user
//! credentials trade their refresh token. Both end in a short-lived access
//! token sent as `Authorization: Bearer` to the Firebase REST APIs.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::credential::{AuthorizedUserKey, Credential, KeyFile, ServiceAccountKey};
use super::error::FirebaseError;

/// Scopes requested for every access token
pub const SCOPES: [&str; 6] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/devstorage.full_control",
    "https://www.googleapis.com/auth/firebase",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

const USER_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A bearer token and its expiry
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Token valid for `expires_in_secs` from `now`; an unrepresentable expiry is an error
    pub fn new(
        token: impl Into<String>,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, FirebaseError> {
        let expires_at = TimeDelta::try_seconds(expires_in_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                FirebaseError::TokenExchange(format!("token lifetime out of range: {}s", expires_in_secs))
            })?;
        Ok(Self {
            token: token.into(),
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Exchanges a credential for an access token
#[async_trait]
pub trait Connector: Send + Sync {
    async fn fetch_token(&self, credential: &Credential) -> Result<AccessToken, FirebaseError>;
}

/// Claims of the signed assertion sent to the token endpoint
#[derive(Debug, Serialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(key: &ServiceAccountKey, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: key.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Talks to Google's OAuth2 endpoints
pub struct GoogleConnector {
    client: Client,
}

impl GoogleConnector {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn service_account_token(
        &self,
        key: &ServiceAccountKey,
    ) -> Result<AccessToken, FirebaseError> {
        let now = Utc::now();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id.clone();
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let assertion = jsonwebtoken::encode(&header, &AssertionClaims::new(key, now), &signing_key)?;

        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        self.exchange(&key.token_uri, &form, now).await
    }

    async fn authorized_user_token(
        &self,
        key: &AuthorizedUserKey,
    ) -> Result<AccessToken, FirebaseError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", key.client_id.as_str()),
            ("client_secret", key.client_secret.as_str()),
            ("refresh_token", key.refresh_token.as_str()),
        ];
        self.exchange(USER_TOKEN_URI, &form, Utc::now()).await
    }

    async fn exchange(
        &self,
        token_uri: &str,
        form: &[(&str, &str)],
        now: DateTime<Utc>,
    ) -> Result<AccessToken, FirebaseError> {
        let response = self.client.post(token_uri).form(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FirebaseError::TokenExchange(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FirebaseError::TokenExchange(format!("malformed token response: {}", e)))?;
        AccessToken::new(token.access_token, token.expires_in, now)
    }
}

impl Default for GoogleConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for GoogleConnector {
    async fn fetch_token(&self, credential: &Credential) -> Result<AccessToken, FirebaseError> {
        match credential {
            Credential::LocalFile(key)
            | Credential::BundledAsset(key)
            | Credential::ApplicationDefault(KeyFile::ServiceAccount(key)) => {
                self.service_account_token(key).await
            }
            Credential::ApplicationDefault(KeyFile::AuthorizedUser(key)) => {
                self.authorized_user_token(key).await
            }
        }
    }
}
