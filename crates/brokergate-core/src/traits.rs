//! Trait seams of the decision pipeline.
//!
//! - `CredentialStore`   — the external backing store (read-only from here)
//! - `StoreConnector`    — builds store handles for the handle cache
//! - `PolicySynthesizer` — turns an identity and an auth outcome into a decision
//!
//! The `Authorizer` wires them together in a fixed order. Store
//! implementations are external collaborators; the synthesizer is trusted
//! and must be deterministic apart from the principal identifier.

use std::sync::Arc;

use brokergate_contracts::{
    error::BrokerGateResult,
    identity::IdentityRecord,
    policy::PolicyDecision,
};

/// A loosely typed store item: attribute name to JSON value.
pub type StoreItem = serde_json::Map<String, serde_json::Value>;

/// Point-lookup access to the credential table.
///
/// Implementations must never write. Connectivity problems are returned as
/// `StoreUnavailable`; a missing key is `Ok(None)`.
pub trait CredentialStore: Send + Sync {
    /// Fetch the item keyed by `key`, restricted to `projection` attributes.
    fn get_item(&self, key: &str, projection: &[&str]) -> BrokerGateResult<Option<StoreItem>>;
}

/// A shareable, reusable connection to the credential store.
pub type StoreHandle = Arc<dyn CredentialStore>;

/// Factory for store handles, called by the `HandleCache` on a miss.
///
/// Construction failures should be reported as `HandleSetup`.
pub trait StoreConnector: Send + Sync {
    fn connect(&self) -> BrokerGateResult<StoreHandle>;
}

/// Builds the decision returned to the gateway.
pub trait PolicySynthesizer: Send + Sync {
    /// Produce a decision for `client_id`.
    ///
    /// When `authenticated` is false or `record` is `None` the result must be
    /// a denial: no password echo and no statements, whatever the record
    /// would otherwise permit.
    fn synthesize(
        &self,
        record: Option<&IdentityRecord>,
        authenticated: bool,
        client_id: &str,
    ) -> PolicyDecision;
}
