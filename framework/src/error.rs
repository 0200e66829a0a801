//! Framework-wide error types
//!
//! Provides a unified error type that can be used throughout the framework
//! and automatically converts to appropriate HTTP responses.

use thiserror::Error;

/// Framework-wide error type
///
/// Handlers return `Response = Result<HttpResponse, HttpResponse>`, and
/// `FrameworkError` converts into `HttpResponse`, so `?` works inside handlers.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn show(req: Request) -> Response {
///     let registry = req.service::<ServiceRegistry>()?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    #[error("Service '{type_name}' not registered in container")]
    ServiceNotFound { type_name: &'static str },

    #[error("Missing required parameter: {param_name}")]
    ParamError { param_name: String },

    /// A configuration key is missing or unusable; fatal during startup
    #[error("Configuration error for '{key}': {message}")]
    Config { key: String, message: String },

    #[error("Request body exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Listener or connection failure
    #[error("Server error: {0}")]
    Server(String),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// Application error carrying its own status code
    #[error("{message}")]
    Domain { message: String, status_code: u16 },
}

impl FrameworkError {
    /// ServiceNotFound naming `T`
    pub fn service_not_found<T: ?Sized>() -> Self {
        Self::ServiceNotFound {
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::ParamError {
            param_name: name.into(),
        }
    }

    /// Create a Config error
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a Domain error with custom status code
    pub fn domain(message: impl Into<String>, status_code: u16) -> Self {
        Self::Domain {
            message: message.into(),
            status_code,
        }
    }

    /// HTTP status used when the error reaches a client
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ParamError { .. } => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Domain { status_code, .. } => *status_code,
            Self::ServiceNotFound { .. } | Self::Config { .. } | Self::Server(_) | Self::Internal { .. } => 500,
        }
    }
}

impl From<std::io::Error> for FrameworkError {
    fn from(e: std::io::Error) -> Self {
        Self::Server(e.to_string())
    }
}
