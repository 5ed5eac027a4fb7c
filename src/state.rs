use crate::config::ServerConfig;
use crate::store::JsonFileStore;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Shared application state: configuration plus the durable store. One
/// instance lives behind an `Arc` for the lifetime of the server.
pub struct AppState {
    config: Arc<ServerConfig>,
    store: JsonFileStore,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        let store = JsonFileStore::open(&config.data_file)
            .with_context(|| format!("failed to open catalog at {:?}", config.data_file))?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }
}
