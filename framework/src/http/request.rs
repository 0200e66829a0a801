use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use super::body::parse_json;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::FrameworkError;

/// HTTP request handed to handlers
///
/// The body is already collected (and size-checked) by the server. The request
/// also carries the shared [`AppContext`] so handlers reach configuration and
/// services without globals.
pub struct Request {
    parts: hyper::http::request::Parts,
    body: Bytes,
    params: HashMap<String, String>,
    context: Arc<AppContext>,
}

impl Request {
    pub fn new(parts: hyper::http::request::Parts, body: Bytes, context: Arc<AppContext>) -> Self {
        Self {
            parts,
            body,
            params: HashMap::new(),
            context,
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Get the request method
    pub fn method(&self) -> &hyper::Method {
        &self.parts.method
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Get a route parameter by name (e.g., /documents/{id})
    pub fn param(&self, name: &str) -> Result<&str, FrameworkError> {
        self.params
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| FrameworkError::param(name))
    }

    /// Get all route parameters
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Get a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the Content-Type header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parse the request body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        parse_json(&self.body)
    }

    /// The shared application context
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// The application's configuration store
    pub fn config(&self) -> &Config {
        self.context.config()
    }

    /// Resolve a concrete service from the container
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// pub async fn show(req: Request) -> Response {
    ///     let registry = req.service::<ServiceRegistry>()?;
    ///     // ...
    /// }
    /// ```
    pub fn service<T: Any + Send + Sync + Clone + 'static>(&self) -> Result<T, FrameworkError> {
        self.context.service::<T>()
    }
}
