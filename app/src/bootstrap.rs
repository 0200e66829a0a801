//! Application Bootstrap
//!
//! Opens the backend services once configuration is in place and returns the
//! container shared with every request.
//!
//! A backend that cannot be reached does not stop the server: the registry is
//! registered as unavailable and handlers report it.

use std::sync::Arc;

use web::{Config, Container, FrameworkError, ProcessEnv, VarSource};

use crate::config::FirebaseConfig;
use crate::firebase::{initialize, Connector, GoogleConnector};
use crate::services::ServiceRegistry;

/// Register services
///
/// Called by the application builder after configuration and routes.
pub async fn register(config: Arc<Config>) -> Result<Container, FrameworkError> {
    register_with(config, &ProcessEnv, Arc::new(GoogleConnector::new())).await
}

/// Same as [`register`] with an explicit environment and token connector
pub async fn register_with(
    config: Arc<Config>,
    vars: &dyn VarSource,
    connector: Arc<dyn Connector>,
) -> Result<Container, FrameworkError> {
    let firebase = config
        .get::<FirebaseConfig>()
        .ok_or_else(|| FrameworkError::config("FIREBASE", "Firebase config not registered"))?;

    let registry = match initialize(&firebase, vars, connector).await {
        Some(handles) => ServiceRegistry::new(Some(handles)),
        None => {
            tracing::warn!("Firebase initialization failed; serving without backend services");
            ServiceRegistry::unavailable()
        }
    };

    let mut container = Container::new();
    container.singleton(registry);
    Ok(container)
}
