//! Shared application context
//!
//! Built once at startup from the filled configuration store and container,
//! then shared read-only with every request through an `Arc`.

use std::any::Any;
use std::sync::Arc;

use crate::config::Config;
use crate::container::Container;
use crate::error::FrameworkError;

pub struct AppContext {
    config: Arc<Config>,
    container: Container,
}

impl AppContext {
    pub fn new(config: impl Into<Arc<Config>>, container: Container) -> Self {
        Self {
            config: config.into(),
            container,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolve a concrete service
    pub fn service<T: Any + Send + Sync + Clone + 'static>(&self) -> Result<T, FrameworkError> {
        self.container.resolve::<T>()
    }
}
