//! Firebase backend: credential discovery, token exchange and REST handles

mod client;
mod connector;
mod credential;
mod error;
mod initializer;

pub use client::{
    ApiEndpoints, FirebaseApp, FirebaseAuth, FirebaseOptions, FirestoreClient, StorageBucket,
};
pub use connector::{AccessToken, AssertionClaims, Connector, GoogleConnector, SCOPES};
pub use credential::{
    ambient_key_path, AuthorizedUserKey, Credential, CredentialChain, CredentialSource, KeyFile,
    ServiceAccountKey, GCLOUD_ADC_PATH,
};
pub use error::FirebaseError;
pub use initializer::{initialize, ServiceHandles};
