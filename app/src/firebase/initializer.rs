use std::sync::Arc;

use web::VarSource;

use super::client::{FirebaseApp, FirebaseOptions, FirestoreClient, StorageBucket};
use super::connector::Connector;
use super::credential::CredentialChain;
use super::error::FirebaseError;
use crate::config::FirebaseConfig;

/// The backend handles opened at startup, present together or not at all
#[derive(Clone)]
pub struct ServiceHandles {
    pub app: FirebaseApp,
    pub database: FirestoreClient,
    pub storage: StorageBucket,
}

/// Open the Firebase backend
///
/// Any failure, including running past `init_timeout`, is logged and turns
/// into `None`.
pub async fn initialize(
    config: &FirebaseConfig,
    vars: &dyn VarSource,
    connector: Arc<dyn Connector>,
) -> Option<ServiceHandles> {
    let chain = CredentialChain::from_config(config);
    let opened = tokio::time::timeout(config.init_timeout, open(&chain, config, vars, connector))
        .await
        .unwrap_or(Err(FirebaseError::Timeout(config.init_timeout)));

    match opened {
        Ok(handles) => {
            tracing::info!(
                project_id = %handles.app.project_id(),
                credential = handles.app.credential_kind(),
                bucket = %handles.storage.name(),
                "Firebase initialized"
            );
            Some(handles)
        }
        Err(err) => {
            tracing::error!(error = %err, "Error initializing Firebase");
            None
        }
    }
}

async fn open(
    chain: &CredentialChain,
    config: &FirebaseConfig,
    vars: &dyn VarSource,
    connector: Arc<dyn Connector>,
) -> Result<ServiceHandles, FirebaseError> {
    let credential = chain.resolve(vars)?;
    let app = FirebaseApp::open(credential, FirebaseOptions::from(config), connector).await?;

    Ok(ServiceHandles {
        database: app.firestore(),
        storage: app.storage_bucket(),
        app,
    })
}
