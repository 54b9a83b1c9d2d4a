use std::sync::Arc;

use crate::{
    config::AppConfig,
    platform::{
        DocumentStore, Firestore, GoogleIdentity, IdentityProvider, ServiceAccount, TokenSource,
    },
};

/// Handles to the two platform collaborators, built once at boot and shared
/// by every request. The service keeps no other state.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub documents: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Wire the real platform clients from the service-account key named
    /// by configuration. A missing or unusable key is fatal.
    pub fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let account = ServiceAccount::from_file(&config.service_account_path)?;
        let http = reqwest::Client::new();
        let tokens = Arc::new(TokenSource::new(account.clone(), http.clone())?);
        let identity = Arc::new(GoogleIdentity::new(
            &account.project_id,
            http.clone(),
            tokens.clone(),
        ));
        let documents = Arc::new(Firestore::new(&account.project_id, http, tokens));
        Ok(Self::from_parts(identity, documents))
    }

    pub fn from_parts(
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            identity,
            documents,
        }
    }
}
