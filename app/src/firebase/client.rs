//! Handles to the Firebase backend
//!
//! [`FirebaseApp`] owns the credential and a cached access token. The
//! database, storage and auth handles are cheap clones that borrow its
//! authorization for REST calls.

use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use tokio::sync::RwLock;

use super::connector::{AccessToken, Connector};
use super::credential::Credential;
use super::error::FirebaseError;
use crate::config::FirebaseConfig;

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
const STORAGE_API: &str = "https://storage.googleapis.com/storage/v1";
const IDENTITY_API: &str = "https://identitytoolkit.googleapis.com/v1";

/// Options the app handle is opened with
#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseOptions {
    pub project_id: String,
    pub storage_bucket: String,
    pub database_url: String,
}

/// REST API roots the handles build their URLs from
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoints {
    pub firestore: String,
    pub storage: String,
    pub identity: String,
}

impl ApiEndpoints {
    /// Serve every API from one base URL, as an emulator does
    pub fn single(base: &str) -> Self {
        Self {
            firestore: base.to_string(),
            storage: base.to_string(),
            identity: base.to_string(),
        }
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            firestore: FIRESTORE_API.to_string(),
            storage: STORAGE_API.to_string(),
            identity: IDENTITY_API.to_string(),
        }
    }
}

impl From<&FirebaseConfig> for FirebaseOptions {
    fn from(config: &FirebaseConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            storage_bucket: config.storage_bucket.clone(),
            database_url: config.database_url.clone(),
        }
    }
}

struct AppInner {
    credential: Credential,
    options: FirebaseOptions,
    endpoints: ApiEndpoints,
    connector: Arc<dyn Connector>,
    token: RwLock<AccessToken>,
    http: Client,
}

/// The credentialed app handle
#[derive(Clone)]
pub struct FirebaseApp {
    inner: Arc<AppInner>,
}

impl FirebaseApp {
    /// Open the app handle, fetching the first access token
    pub async fn open(
        credential: Credential,
        options: FirebaseOptions,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, FirebaseError> {
        Self::open_with_endpoints(credential, options, connector, ApiEndpoints::default()).await
    }

    /// Same as [`FirebaseApp::open`] against custom API roots
    pub async fn open_with_endpoints(
        credential: Credential,
        options: FirebaseOptions,
        connector: Arc<dyn Connector>,
        endpoints: ApiEndpoints,
    ) -> Result<Self, FirebaseError> {
        let token = connector.fetch_token(&credential).await?;
        tracing::debug!(
            credential = credential.kind(),
            project_id = %options.project_id,
            expires_at = %token.expires_at,
            "access token acquired"
        );

        Ok(Self {
            inner: Arc::new(AppInner {
                credential,
                options,
                endpoints,
                connector,
                token: RwLock::new(token),
                http: Client::new(),
            }),
        })
    }

    pub fn options(&self) -> &FirebaseOptions {
        &self.inner.options
    }

    pub fn project_id(&self) -> &str {
        &self.inner.options.project_id
    }

    pub fn credential_kind(&self) -> &'static str {
        self.inner.credential.kind()
    }

    fn endpoints(&self) -> &ApiEndpoints {
        &self.inner.endpoints
    }

    /// A valid bearer token, refreshed when close to expiry
    pub async fn access_token(&self) -> Result<String, FirebaseError> {
        {
            let token = self.inner.token.read().await;
            if !token.is_expired(Utc::now()) {
                return Ok(token.token.clone());
            }
        }

        let mut token = self.inner.token.write().await;
        // another task may have refreshed while we waited for the lock
        if token.is_expired(Utc::now()) {
            *token = self.inner.connector.fetch_token(&self.inner.credential).await?;
            tracing::debug!(expires_at = %token.expires_at, "access token refreshed");
        }
        Ok(token.token.clone())
    }

    pub fn firestore(&self) -> FirestoreClient {
        FirestoreClient { app: self.clone() }
    }

    pub fn storage_bucket(&self) -> StorageBucket {
        StorageBucket {
            app: self.clone(),
            name: self.inner.options.storage_bucket.clone(),
        }
    }

    pub fn auth(&self) -> FirebaseAuth {
        FirebaseAuth { app: self.clone() }
    }

    /// Send an authorized request; a 404 yields `None`
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Option<Value>, FirebaseError> {
        let token = self.access_token().await?;
        let mut request = self.inner.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(FirebaseError::Backend {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Build a URL from a base and path segments, escaping each segment
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, FirebaseError> {
    let mut url = Url::parse(base).map_err(|e| FirebaseError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FirebaseError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Firestore document database client
#[derive(Clone)]
pub struct FirestoreClient {
    app: FirebaseApp,
}

impl FirestoreClient {
    /// `projects/{project}/databases/(default)`
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.app.project_id())
    }

    pub fn document_url(&self, collection: &str, id: &str) -> Result<Url, FirebaseError> {
        endpoint(
            &self.app.endpoints().firestore,
            &[
                "projects",
                self.app.project_id(),
                "databases",
                "(default)",
                "documents",
                collection,
                id,
            ],
        )
    }

    /// Fetch one document, `None` when it does not exist
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, FirebaseError> {
        self.app
            .send(Method::GET, self.document_url(collection, id)?, None)
            .await
    }
}

/// Cloud Storage bucket client
#[derive(Clone)]
pub struct StorageBucket {
    app: FirebaseApp,
    name: String,
}

impl StorageBucket {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metadata URL for an object; `/` in the object name is escaped
    pub fn object_url(&self, object: &str) -> Result<Url, FirebaseError> {
        endpoint(&self.app.endpoints().storage, &["b", &self.name, "o", object])
    }

    /// Fetch object metadata, `None` when the object does not exist
    pub async fn object_metadata(&self, object: &str) -> Result<Option<Value>, FirebaseError> {
        self.app.send(Method::GET, self.object_url(object)?, None).await
    }
}

/// Firebase Authentication client
#[derive(Clone)]
pub struct FirebaseAuth {
    app: FirebaseApp,
}

impl FirebaseAuth {
    pub fn lookup_url(&self) -> Result<Url, FirebaseError> {
        endpoint(
            &self.app.endpoints().identity,
            &["projects", self.app.project_id(), "accounts:lookup"],
        )
    }

    /// Look a user up by uid, `None` when unknown
    pub async fn get_user(&self, uid: &str) -> Result<Option<Value>, FirebaseError> {
        let body = serde_json::json!({ "localId": [uid] });
        let found = self
            .app
            .send(Method::POST, self.lookup_url()?, Some(&body))
            .await?;
        Ok(found.and_then(|mut v| v.get_mut("users").and_then(|u| u.get_mut(0)).map(Value::take)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firebase::testing::{service_account_credential, FakeConnector};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn options() -> FirebaseOptions {
        FirebaseOptions {
            project_id: "lexai-test".to_string(),
            storage_bucket: "lexai-test.firebasestorage.app".to_string(),
            database_url: "https://lexai-test.firebasedatabase.app".to_string(),
        }
    }

    async fn app(connector: Arc<FakeConnector>) -> FirebaseApp {
        FirebaseApp::open(service_account_credential("lexai-test"), options(), connector)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_handle_urls() {
        let app = app(Arc::new(FakeConnector::ok())).await;

        assert_eq!(
            app.firestore().database_path(),
            "projects/lexai-test/databases/(default)"
        );
        assert_eq!(
            app.firestore().document_url("cases", "c-1").unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/lexai-test/databases/(default)/documents/cases/c-1"
        );
        assert_eq!(app.storage_bucket().name(), "lexai-test.firebasestorage.app");
        assert_eq!(
            app.storage_bucket().object_url("docs/brief.pdf").unwrap().as_str(),
            "https://storage.googleapis.com/storage/v1/b/lexai-test.firebasestorage.app/o/docs%2Fbrief.pdf"
        );
        assert_eq!(
            app.auth().lookup_url().unwrap().as_str(),
            "https://identitytoolkit.googleapis.com/v1/projects/lexai-test/accounts:lookup"
        );
    }

    #[tokio::test]
    async fn test_token_cached_until_expiry() {
        let connector = Arc::new(FakeConnector::ok());
        let app = app(connector.clone()).await;

        assert_eq!(app.access_token().await.unwrap(), "token-1");
        assert_eq!(app.access_token().await.unwrap(), "token-1");
        assert_eq!(connector.calls(), 1);
        assert_eq!(app.credential_kind(), "local key file");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let connector = Arc::new(FakeConnector::with_lifetime(30));
        let app = app(connector.clone()).await;

        assert_eq!(app.access_token().await.unwrap(), "token-2");
        assert_eq!(connector.calls(), 2);
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Local stand-in for the REST APIs. Paths naming `missing` get 404,
    /// `broken` gets 500, and requests without the bearer token get 401.
    async fn backend() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let request = read_request(&mut stream).await;
                    let path = request
                        .lines()
                        .next()
                        .and_then(|line| line.split(' ').nth(1))
                        .unwrap_or_default()
                        .to_string();

                    let (status, body) = if !request
                        .to_ascii_lowercase()
                        .contains("authorization: bearer token-1")
                    {
                        ("401 Unauthorized", "no token".to_string())
                    } else if path.contains("missing") {
                        ("404 Not Found", json!({ "error": "not found" }).to_string())
                    } else if path.contains("broken") {
                        ("500 Internal Server Error", "backend exploded".to_string())
                    } else if path.ends_with("accounts:lookup") {
                        let users = if request.contains("u-1") {
                            json!({ "users": [{ "localId": "u-1", "email": "counsel@lexai.test" }] })
                        } else {
                            json!({})
                        };
                        ("200 OK", users.to_string())
                    } else {
                        ("200 OK", json!({ "name": path }).to_string())
                    };

                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    async fn local_app() -> FirebaseApp {
        FirebaseApp::open_with_endpoints(
            service_account_credential("lexai-test"),
            options(),
            Arc::new(FakeConnector::ok()),
            ApiEndpoints::single(&backend().await),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_document_found_and_missing() {
        let db = local_app().await.firestore();

        let found = db.get_document("cases", "c-1").await.unwrap().unwrap();
        assert_eq!(
            found["name"],
            "/projects/lexai-test/databases/(default)/documents/cases/c-1"
        );
        assert!(db.get_document("cases", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_error_carries_status_and_body() {
        let bucket = local_app().await.storage_bucket();

        let err = bucket.object_metadata("broken.pdf").await.unwrap_err();
        assert!(matches!(
            err,
            FirebaseError::Backend { status: 500, ref message } if message == "backend exploded"
        ));
        assert!(bucket.object_metadata("missing.pdf").await.unwrap().is_none());
        assert!(bucket.object_metadata("brief.pdf").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_user_unwraps_lookup() {
        let auth = local_app().await.auth();

        let user = auth.get_user("u-1").await.unwrap().unwrap();
        assert_eq!(user["email"], "counsel@lexai.test");
        assert!(auth.get_user("u-2").await.unwrap().is_none());
    }
}
