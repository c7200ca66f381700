//! In-memory implementation of `CredentialStore`.
//!
//! `InMemoryCredentialStore` keeps items in a `HashMap` behind an
//! `Arc<Mutex<_>>`. Clones share the same table, so a connector can hand out
//! fresh handles that all see items seeded through any one of them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use brokergate_contracts::{
    error::{BrokerGateError, BrokerGateResult},
    identity::CLIENT_ID_ATTRIBUTE,
};
use brokergate_core::traits::{CredentialStore, StoreConnector, StoreHandle, StoreItem};

// ── Store ─────────────────────────────────────────────────────────────────────

/// A shared, in-process credential table keyed by `Client_ID`.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    pub(crate) items: Arc<Mutex<HashMap<String, StoreItem>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item. The item must carry a string `Client_ID`.
    ///
    /// Only used to seed the table; the authorizer itself never writes.
    pub fn put_item(&self, item: StoreItem) -> BrokerGateResult<()> {
        let key = item
            .get(CLIENT_ID_ATTRIBUTE)
            .and_then(|v| v.as_str())
            .ok_or_else(|| BrokerGateError::MalformedRecord {
                client_id: "<missing>".to_string(),
                reason: format!("item has no string '{}' key attribute", CLIENT_ID_ATTRIBUTE),
            })?
            .to_string();

        self.table().insert(key, item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every write is a single insert, so a poisoned table is still whole.
    fn table(&self) -> MutexGuard<'_, HashMap<String, StoreItem>> {
        self.items.lock().unwrap_or_else(|poisoned| {
            self.items.clear_poison();
            poisoned.into_inner()
        })
    }
}

impl CredentialStore for InMemoryCredentialStore {
    /// Return the projected attributes of the item keyed by `key`.
    ///
    /// Attributes named in `projection` but absent from the item are simply
    /// left out, as a real table would do.
    fn get_item(&self, key: &str, projection: &[&str]) -> BrokerGateResult<Option<StoreItem>> {
        let items = self.table();
        let projected = items.get(key).map(|item| {
            item.iter()
                .filter(|(attr, _)| projection.contains(&attr.as_str()))
                .map(|(attr, value)| (attr.clone(), value.clone()))
                .collect::<StoreItem>()
        });

        debug!(key = %key, found = projected.is_some(), "in-memory get_item");
        Ok(projected)
    }
}

// ── Connector ─────────────────────────────────────────────────────────────────

/// Hands out handles onto one shared `InMemoryCredentialStore`.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    store: InMemoryCredentialStore,
}

impl InMemoryConnector {
    pub fn new(store: InMemoryCredentialStore) -> Self {
        Self { store }
    }
}

impl StoreConnector for InMemoryConnector {
    fn connect(&self) -> BrokerGateResult<StoreHandle> {
        Ok(Arc::new(self.store.clone()))
    }
}
