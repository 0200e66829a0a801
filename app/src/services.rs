//! Service registry
//!
//! Holds the backend handles opened at bootstrap. Handlers resolve the
//! registry from the container and check availability themselves.

use crate::firebase::{FirebaseApp, FirebaseAuth, FirestoreClient, ServiceHandles, StorageBucket};

pub const FIREBASE_APP: &str = "FIREBASE_APP";
pub const FIRESTORE_DB: &str = "FIRESTORE_DB";
pub const FIREBASE_STORAGE: &str = "FIREBASE_STORAGE";
pub const FIREBASE_AUTH: &str = "FIREBASE_AUTH";

/// A handle looked up by its registry key
#[derive(Clone, Copy)]
pub enum ServiceHandle<'a> {
    App(&'a FirebaseApp),
    Database(&'a FirestoreClient),
    Storage(&'a StorageBucket),
    Auth(&'a FirebaseAuth),
}

#[derive(Clone)]
pub struct ServiceRegistry {
    handles: Option<ServiceHandles>,
    auth: Option<FirebaseAuth>,
}

impl ServiceRegistry {
    pub fn new(handles: Option<ServiceHandles>) -> Self {
        let auth = handles.as_ref().map(|h| h.app.auth());
        Self { handles, auth }
    }

    /// A registry with every handle absent
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    pub fn is_available(&self) -> bool {
        self.handles.is_some()
    }

    pub fn app(&self) -> Option<&FirebaseApp> {
        self.handles.as_ref().map(|h| &h.app)
    }

    pub fn database(&self) -> Option<&FirestoreClient> {
        self.handles.as_ref().map(|h| &h.database)
    }

    pub fn storage_bucket(&self) -> Option<&StorageBucket> {
        self.handles.as_ref().map(|h| &h.storage)
    }

    pub fn auth(&self) -> Option<&FirebaseAuth> {
        self.auth.as_ref()
    }

    /// Look a handle up by key (`FIREBASE_APP`, `FIRESTORE_DB`, ...)
    pub fn get(&self, key: &str) -> Option<ServiceHandle<'_>> {
        match key {
            FIREBASE_APP => self.app().map(ServiceHandle::App),
            FIRESTORE_DB => self.database().map(ServiceHandle::Database),
            FIREBASE_STORAGE => self.storage_bucket().map(ServiceHandle::Storage),
            FIREBASE_AUTH => self.auth().map(ServiceHandle::Auth),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firebase::testing::{service_account_credential, FakeConnector};
    use crate::firebase::FirebaseOptions;
    use std::sync::Arc;

    const KEYS: [&str; 4] = [FIREBASE_APP, FIRESTORE_DB, FIREBASE_STORAGE, FIREBASE_AUTH];

    #[test]
    fn test_unavailable_registry_has_no_handles() {
        let registry = ServiceRegistry::unavailable();
        assert!(!registry.is_available());
        assert!(registry.app().is_none());
        assert!(registry.database().is_none());
        assert!(registry.storage_bucket().is_none());
        assert!(registry.auth().is_none());
        for key in KEYS {
            assert!(registry.get(key).is_none(), "{} should be absent", key);
        }
    }

    #[tokio::test]
    async fn test_available_registry_exposes_every_key() {
        let app = FirebaseApp::open(
            service_account_credential("lexai-test"),
            FirebaseOptions {
                project_id: "lexai-test".to_string(),
                storage_bucket: "bucket".to_string(),
                database_url: "https://db".to_string(),
            },
            Arc::new(FakeConnector::ok()),
        )
        .await
        .unwrap();
        let registry = ServiceRegistry::new(Some(ServiceHandles {
            database: app.firestore(),
            storage: app.storage_bucket(),
            app,
        }));

        assert!(registry.is_available());
        for key in KEYS {
            assert!(registry.get(key).is_some(), "{} should be present", key);
        }
        assert!(matches!(
            registry.get(FIREBASE_STORAGE),
            Some(ServiceHandle::Storage(bucket)) if bucket.name() == "bucket"
        ));
        assert!(registry.get("UNKNOWN").is_none());
    }
}
