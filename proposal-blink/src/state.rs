//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::indexer::{IndexerClient, IndexerError};

/// State passed to every handler. Nothing in it is mutated after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub indexer: IndexerClient,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, IndexerError> {
        let indexer = IndexerClient::new(config.indexer_url.clone(), config.indexer_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            indexer,
        })
    }
}
