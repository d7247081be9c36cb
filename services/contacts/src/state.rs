//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::AppConfig, middleware::TokenVerifier, repositories::ContactRepository,
    store::ContactStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub contacts: ContactRepository,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContactStore>) -> Self {
        let verifier = TokenVerifier::new(&config.jwt.secret);

        Self {
            config: Arc::new(config),
            contacts: ContactRepository::new(store),
            verifier,
        }
    }
}
