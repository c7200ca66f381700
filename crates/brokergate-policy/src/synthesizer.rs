//! Broker policy synthesis.
//!
//! `IotPolicySynthesizer` implements the `PolicySynthesizer` trait from
//! brokergate-core.
//!
//! Statement algorithm for an authenticated identity, in this fixed order:
//!
//! 1. `iot:Connect`   on `client/<client id>`      if `allow_connect`
//! 2. `iot:Subscribe` on `topicfilter/<read_topic>` if `allow_read`
//! 3. `iot:Receive`   on `topic/<read_topic>`       if `allow_read`
//! 4. `iot:Publish`   on `topic/<write_topic>`      if `allow_write`
//!
//! Subscribe and Receive are both required for reading: the broker checks
//! them on different operations. Unauthenticated decisions carry no
//! statements at all.

use tracing::debug;

use brokergate_contracts::{
    config::AuthorizerConfig,
    identity::IdentityRecord,
    policy::{PolicyAction, PolicyDecision, PolicyDocument, PolicyStatement},
};
use brokergate_core::traits::PolicySynthesizer;

use crate::principal::format_principal;

/// Builds decisions scoped to one region and account.
///
/// ```rust,ignore
/// use brokergate_policy::IotPolicySynthesizer;
///
/// let synthesizer = IotPolicySynthesizer::from_config(&config);
/// ```
#[derive(Debug, Clone)]
pub struct IotPolicySynthesizer {
    /// `arn:aws:iot:<region>:<account>`
    resource_prefix: String,
    disconnect_after_seconds: u64,
    refresh_after_seconds: u64,
}

impl IotPolicySynthesizer {
    pub fn new(
        region: &str,
        account_id: &str,
        disconnect_after_seconds: u64,
        refresh_after_seconds: u64,
    ) -> Self {
        Self {
            resource_prefix: format!("arn:aws:iot:{}:{}", region, account_id),
            disconnect_after_seconds,
            refresh_after_seconds,
        }
    }

    pub fn from_config(config: &AuthorizerConfig) -> Self {
        Self::new(
            &config.region,
            &config.account_id,
            config.disconnect_after_seconds,
            config.refresh_after_seconds,
        )
    }

    fn client_resource(&self, client_id: &str) -> String {
        format!("{}:client/{}", self.resource_prefix, client_id)
    }

    fn topic_filter_resource(&self, filter: &str) -> String {
        format!("{}:topicfilter/{}", self.resource_prefix, filter)
    }

    fn topic_resource(&self, topic: &str) -> String {
        format!("{}:topic/{}", self.resource_prefix, topic)
    }

    /// The statements an authenticated `record` is entitled to.
    pub fn statements_for(&self, record: &IdentityRecord) -> Vec<PolicyStatement> {
        let mut statements = Vec::with_capacity(4);

        if record.allow_connect {
            statements.push(PolicyStatement::allow(
                PolicyAction::Connect,
                self.client_resource(&record.client_id),
            ));
        }
        if record.allow_read {
            statements.push(PolicyStatement::allow(
                PolicyAction::Subscribe,
                self.topic_filter_resource(&record.read_topic),
            ));
            statements.push(PolicyStatement::allow(
                PolicyAction::Receive,
                self.topic_resource(&record.read_topic),
            ));
        }
        if record.allow_write {
            statements.push(PolicyStatement::allow(
                PolicyAction::Publish,
                self.topic_resource(&record.write_topic),
            ));
        }

        statements
    }
}

impl PolicySynthesizer for IotPolicySynthesizer {
    fn synthesize(
        &self,
        record: Option<&IdentityRecord>,
        authenticated: bool,
        client_id: &str,
    ) -> PolicyDecision {
        // Both the echo and the statements come from the same gate so a
        // denial can never carry part of a record.
        let granted = record.filter(|_| authenticated);

        let statements = granted
            .map(|r| self.statements_for(r))
            .unwrap_or_default();

        debug!(
            client_id = %client_id,
            authenticated = granted.is_some(),
            statement_count = statements.len(),
            "policy synthesized"
        );

        PolicyDecision {
            password: granted.map(|r| r.password.clone()),
            is_authenticated: granted.is_some(),
            principal_id: format_principal(client_id),
            disconnect_after_in_seconds: self.disconnect_after_seconds,
            refresh_after_in_seconds: self.refresh_after_seconds,
            policy_documents: vec![PolicyDocument::new(statements)],
        }
    }
}
