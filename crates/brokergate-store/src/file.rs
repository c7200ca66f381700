//! A credential table loaded from a JSON file.
//!
//! The file holds a JSON array of items, each an object with a `Client_ID`
//! attribute. The file is re-read on every `connect`, so a handle cache TTL
//! also bounds how stale the table can get.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use brokergate_contracts::error::{BrokerGateError, BrokerGateResult};
use brokergate_core::traits::{StoreConnector, StoreHandle, StoreItem};

use crate::memory::InMemoryCredentialStore;

pub struct JsonFileConnector {
    path: PathBuf,
}

impl JsonFileConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and parse the table file into a fresh in-memory store.
    pub fn load(&self) -> BrokerGateResult<InMemoryCredentialStore> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| BrokerGateError::HandleSetup {
            reason: format!("failed to read table file '{}': {}", self.path.display(), e),
        })?;

        let items: Vec<StoreItem> =
            serde_json::from_str(&contents).map_err(|e| BrokerGateError::HandleSetup {
                reason: format!(
                    "table file '{}' is not a JSON array of objects: {}",
                    self.path.display(),
                    e
                ),
            })?;

        let store = InMemoryCredentialStore::new();
        for item in items {
            store.put_item(item).map_err(|e| BrokerGateError::HandleSetup {
                reason: format!("table file '{}': {}", self.path.display(), e),
            })?;
        }

        info!(path = %self.path.display(), items = store.len(), "credential table loaded");
        Ok(store)
    }
}

impl StoreConnector for JsonFileConnector {
    fn connect(&self) -> BrokerGateResult<StoreHandle> {
        Ok(Arc::new(self.load()?))
    }
}
