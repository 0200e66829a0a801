use crate::config::env::{env_from, VarSource};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Maximum request body size in bytes (default: 10MB)
    pub max_body_size: usize,
}

impl ServerConfig {
    /// Build config from the given variable source
    pub fn from_vars(vars: &dyn VarSource) -> Self {
        Self {
            host: env_from(vars, "SERVER_HOST", "127.0.0.1".to_string()),
            port: env_from(vars, "SERVER_PORT", 8080),
            max_body_size: env_from(vars, "SERVER_MAX_BODY_SIZE", 10 * 1024 * 1024),
        }
    }

    /// Create a builder seeded with this config
    pub fn to_builder(&self) -> ServerConfigBuilder {
        ServerConfigBuilder {
            base: self.clone(),
            ..ServerConfigBuilder::default()
        }
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    base: ServerConfig,
    host: Option<String>,
    port: Option<u16>,
    max_body_size: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the maximum request body size in bytes
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = Some(size);
        self
    }

    /// Build the ServerConfig
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            host: self.host.unwrap_or(self.base.host),
            port: self.port.unwrap_or(self.base.port),
            max_body_size: self.max_body_size.unwrap_or(self.base.max_body_size),
        }
    }
}
