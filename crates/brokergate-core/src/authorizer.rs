//! The decision orchestrator: the single entry point the gateway calls.
//!
//! Every call runs the same fixed sequence:
//!
//!   Normalize → Signature gate → Acquire handle → Lookup → Verify → Synthesize
//!
//! Only "no such identity" and "wrong credentials" become denials. Any other
//! failure is returned as an error, so a denial always means "this client is
//! not authorized" and never "the authorizer could not tell".

use std::time::Duration;

use tracing::{debug, info, warn};

use brokergate_contracts::{
    claim::{AuthorizerInput, ConnectionClaim},
    config::AuthorizerConfig,
    error::BrokerGateResult,
    identity::Lookup,
    policy::PolicyDecision,
};

use crate::{
    cache::HandleCache,
    credentials,
    traits::{PolicySynthesizer, StoreConnector},
};

/// Decides whether one connection attempt is trusted.
///
/// Construct one per process and share it; it is `Send + Sync`. The store
/// handle cache inside it is the only state that outlives a call.
pub struct Authorizer {
    cache: HandleCache,
    synthesizer: Box<dyn PolicySynthesizer>,
    require_signature_verification: bool,
}

impl Authorizer {
    /// Build an authorizer from deployment configuration.
    pub fn new(
        config: &AuthorizerConfig,
        connector: Box<dyn StoreConnector>,
        synthesizer: Box<dyn PolicySynthesizer>,
    ) -> Self {
        let cache = HandleCache::new(connector, Duration::from_secs(config.handle_ttl_seconds));
        Self::with_cache(config, cache, synthesizer)
    }

    /// Build an authorizer around an existing handle cache.
    pub fn with_cache(
        config: &AuthorizerConfig,
        cache: HandleCache,
        synthesizer: Box<dyn PolicySynthesizer>,
    ) -> Self {
        Self {
            cache,
            synthesizer,
            require_signature_verification: config.require_signature_verification,
        }
    }

    pub fn cache(&self) -> &HandleCache {
        &self.cache
    }

    /// Validate a parsed gateway envelope and decide on it.
    pub fn decide_input(&self, input: AuthorizerInput) -> BrokerGateResult<PolicyDecision> {
        input.validate()?;
        self.decide(input.into_claim())
    }

    /// Decide on a single connection claim.
    ///
    /// # Errors
    ///
    /// Returns `Err` for handle setup failures, store failures, and malformed
    /// identity records. Unknown clients and credential mismatches are NOT
    /// errors; they are denials.
    pub fn decide(&self, mut claim: ConnectionClaim) -> BrokerGateResult<PolicyDecision> {
        claim.normalize_username();
        debug!(client_id = %claim.client_id, "authorizing connection");

        if self.require_signature_verification && claim.signature_verified != Some(true) {
            warn!(
                client_id = %claim.client_id,
                "token signature not verified by gateway, denying"
            );
            return Ok(self.deny(&claim));
        }

        let handle = self.cache.acquire()?;

        let record = match credentials::fetch(&claim.client_id, handle.as_ref())? {
            Lookup::Found(record) => record,
            Lookup::NotFound => return Ok(self.deny(&claim)),
        };

        let authenticated = credentials::verify(&record, &claim);
        let decision = self
            .synthesizer
            .synthesize(Some(&record), authenticated, &claim.client_id);

        info!(
            client_id = %claim.client_id,
            outcome = ?decision.outcome(),
            statements = decision.statements().count(),
            "connection decided"
        );
        Ok(decision)
    }

    fn deny(&self, claim: &ConnectionClaim) -> PolicyDecision {
        let decision = self.synthesizer.synthesize(None, false, &claim.client_id);
        info!(client_id = %claim.client_id, outcome = ?decision.outcome(), "connection decided");
        decision
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::json;

    use brokergate_contracts::{
        claim::{AuthorizerInput, ConnectionClaim},
        config::AuthorizerConfig,
        error::{BrokerGateError, BrokerGateResult},
        identity::IdentityRecord,
        policy::{DecisionOutcome, PolicyAction, PolicyDecision, PolicyDocument, PolicyStatement},
    };

    use crate::traits::{
        CredentialStore, PolicySynthesizer, StoreConnector, StoreHandle, StoreItem,
    };

    use super::Authorizer;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    struct MapStore {
        items: HashMap<String, serde_json::Value>,
        lookups: Arc<AtomicUsize>,
    }

    impl CredentialStore for MapStore {
        fn get_item(&self, key: &str, _projection: &[&str]) -> BrokerGateResult<Option<StoreItem>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.get(key).and_then(|v| v.as_object().cloned()))
        }
    }

    struct MapConnector {
        items: HashMap<String, serde_json::Value>,
        lookups: Arc<AtomicUsize>,
        connects: Arc<AtomicUsize>,
    }

    impl StoreConnector for MapConnector {
        fn connect(&self) -> BrokerGateResult<StoreHandle> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MapStore {
                items: self.items.clone(),
                lookups: Arc::clone(&self.lookups),
            }))
        }
    }

    struct BrokenConnector;

    impl StoreConnector for BrokenConnector {
        fn connect(&self) -> BrokerGateResult<StoreHandle> {
            Err(BrokerGateError::HandleSetup {
                reason: "credentials for store expired".to_string(),
            })
        }
    }

    /// A synthesizer that emits one connect statement per granted record,
    /// enough to observe what the orchestrator passed in.
    struct EchoSynthesizer;

    impl PolicySynthesizer for EchoSynthesizer {
        fn synthesize(
            &self,
            record: Option<&IdentityRecord>,
            authenticated: bool,
            client_id: &str,
        ) -> PolicyDecision {
            let granted = record.filter(|_| authenticated);
            PolicyDecision {
                password: granted.map(|r| r.password.clone()),
                is_authenticated: granted.is_some(),
                principal_id: client_id.to_string(),
                disconnect_after_in_seconds: 3600,
                refresh_after_in_seconds: 3600,
                policy_documents: vec![PolicyDocument::new(
                    granted
                        .map(|r| vec![PolicyStatement::allow(PolicyAction::Connect, r.client_id.clone())])
                        .unwrap_or_default(),
                )],
            }
        }
    }

    struct Harness {
        authorizer: Authorizer,
        lookups: Arc<AtomicUsize>,
        connects: Arc<AtomicUsize>,
    }

    fn harness(config: AuthorizerConfig) -> Harness {
        let mut items = HashMap::new();
        items.insert(
            "C1".to_string(),
            json!({
                "Username": "U1",
                "Password": "P1",
                "allow_connect": true,
                "allow_read": true,
                "allow_write": false,
                "read_topic": "t/*",
                "write_topic": "t/out"
            }),
        );
        items.insert("BROKEN".to_string(), json!({ "Username": "U1" }));

        let lookups = Arc::new(AtomicUsize::new(0));
        let connects = Arc::new(AtomicUsize::new(0));
        let connector = MapConnector {
            items,
            lookups: Arc::clone(&lookups),
            connects: Arc::clone(&connects),
        };

        Harness {
            authorizer: Authorizer::new(&config, Box::new(connector), Box::new(EchoSynthesizer)),
            lookups,
            connects,
        }
    }

    fn claim(client_id: &str, username: &str, password: &str) -> ConnectionClaim {
        ConnectionClaim {
            client_id: client_id.to_string(),
            username: username.to_string(),
            password: STANDARD.encode(password),
            signature_verified: None,
        }
    }

    fn assert_denied(decision: &PolicyDecision) {
        assert_eq!(decision.outcome(), DecisionOutcome::Denied);
        assert!(decision.password.is_none());
        assert_eq!(decision.statements().count(), 0);
    }

    // ── Tests ────────────────────────────────────────────────────────────────

    #[test]
    fn valid_credentials_authenticate() {
        let h = harness(AuthorizerConfig::default());
        let decision = h.authorizer.decide(claim("C1", "U1", "P1")).unwrap();

        assert_eq!(decision.outcome(), DecisionOutcome::Authenticated);
        assert_eq!(decision.password.as_deref(), Some("P1"));
        assert_eq!(decision.statements().count(), 1);
    }

    #[test]
    fn wrong_password_is_denied() {
        let h = harness(AuthorizerConfig::default());
        let decision = h.authorizer.decide(claim("C1", "U1", "WRONG")).unwrap();
        assert_denied(&decision);
    }

    #[test]
    fn unknown_client_is_denied_not_error() {
        let h = harness(AuthorizerConfig::default());
        let decision = h.authorizer.decide(claim("GHOST", "U1", "P1")).unwrap();
        assert_denied(&decision);
        assert_eq!(h.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn gateway_marker_is_stripped_before_comparison() {
        let h = harness(AuthorizerConfig::default());
        let decision = h
            .authorizer
            .decide(claim("C1", "U1?x-amz-customauthorizer-name=foo", "P1"))
            .unwrap();
        assert!(decision.is_authenticated);
    }

    #[test]
    fn malformed_record_is_an_error() {
        let h = harness(AuthorizerConfig::default());
        let result = h.authorizer.decide(claim("BROKEN", "U1", "P1"));
        assert!(matches!(result, Err(BrokerGateError::MalformedRecord { .. })));
    }

    #[test]
    fn handle_setup_failure_is_an_error() {
        let authorizer = Authorizer::new(
            &AuthorizerConfig::default(),
            Box::new(BrokenConnector),
            Box::new(EchoSynthesizer),
        );
        let result = authorizer.decide(claim("C1", "U1", "P1"));
        assert!(matches!(result, Err(BrokerGateError::HandleSetup { .. })));
    }

    #[test]
    fn store_handle_is_reused_across_decisions() {
        let h = harness(AuthorizerConfig::default());
        for _ in 0..5 {
            h.authorizer.decide(claim("C1", "U1", "P1")).unwrap();
        }
        assert_eq!(h.connects.load(Ordering::SeqCst), 1);
        assert_eq!(h.lookups.load(Ordering::SeqCst), 5);
        assert_eq!(h.authorizer.cache().ttl(), std::time::Duration::from_secs(300));
    }

    // ── Signature gate ───────────────────────────────────────────────────────

    #[test]
    fn unsigned_request_short_circuits_when_signature_required() {
        let h = harness(AuthorizerConfig {
            require_signature_verification: true,
            ..AuthorizerConfig::default()
        });

        for flag in [None, Some(false)] {
            let mut c = claim("C1", "U1", "P1");
            c.signature_verified = flag;
            assert_denied(&h.authorizer.decide(c).unwrap());
        }

        assert_eq!(h.connects.load(Ordering::SeqCst), 0);
        assert_eq!(h.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn signed_request_proceeds_when_signature_required() {
        let h = harness(AuthorizerConfig {
            require_signature_verification: true,
            ..AuthorizerConfig::default()
        });
        let mut c = claim("C1", "U1", "P1");
        c.signature_verified = Some(true);
        assert!(h.authorizer.decide(c).unwrap().is_authenticated);
    }

    #[test]
    fn unsigned_request_proceeds_when_signature_not_required() {
        let h = harness(AuthorizerConfig::default());
        let mut c = claim("C1", "U1", "P1");
        c.signature_verified = Some(false);
        assert!(h.authorizer.decide(c).unwrap().is_authenticated);
    }

    // ── Envelope entry point ─────────────────────────────────────────────────

    #[test]
    fn decide_input_rejects_empty_protocols() {
        let h = harness(AuthorizerConfig::default());
        let input: AuthorizerInput = serde_json::from_value(json!({
            "protocols": [],
            "connectionMetadata": { "id": "s1" },
            "protocolData": {
                "mqtt": { "username": "U1", "password": STANDARD.encode("P1"), "clientId": "C1" }
            }
        }))
        .unwrap();

        assert!(matches!(
            h.authorizer.decide_input(input),
            Err(BrokerGateError::EnvelopeInvalid { .. })
        ));
        assert_eq!(h.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn decide_input_authenticates_valid_envelope() {
        let h = harness(AuthorizerConfig::default());
        let input = AuthorizerInput::from_value(json!({
            "protocols": ["mqtt"],
            "connectionMetadata": { "id": "s1" },
            "protocolData": {
                "mqtt": { "username": "U1", "password": STANDARD.encode("P1"), "clientId": "C1" }
            }
        }))
        .unwrap();

        assert!(h.authorizer.decide_input(input).unwrap().is_authenticated);
    }

    #[test]
    fn authorizer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Authorizer>();
    }
}
