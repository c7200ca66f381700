//! Policy statements and the decision envelope returned to the gateway.
//!
//! The serialized shape of [`PolicyDecision`] is the gateway's wire format,
//! so field names here are fixed by the broker and not by Rust convention.

use serde::{Deserialize, Serialize};

/// Schema version tag carried by every policy document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Broker operations a policy statement can name.
///
/// The synthesizer only emits `Connect`, `Subscribe`, `Receive` and
/// `Publish`; the rest exist so any valid broker policy parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyAction {
    #[serde(rename = "iot:Connect")]
    Connect,
    #[serde(rename = "iot:GetRetainedMessage")]
    GetRetainedMessage,
    #[serde(rename = "iot:ListRetainedMessages")]
    ListRetainedMessages,
    #[serde(rename = "iot:Publish")]
    Publish,
    #[serde(rename = "iot:Receive")]
    Receive,
    #[serde(rename = "iot:RetainPublish")]
    RetainPublish,
    #[serde(rename = "iot:Subscribe")]
    Subscribe,
    #[serde(rename = "iot:DeleteThingShadow")]
    DeleteThingShadow,
    #[serde(rename = "iot:GetThingShadow")]
    GetThingShadow,
    #[serde(rename = "iot:ListNamedShadowsForThing")]
    ListNamedShadowsForThing,
    #[serde(rename = "iot:UpdateThingShadow")]
    UpdateThingShadow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One (action, effect, resource) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: PolicyAction,
    pub effect: Effect,
    pub resource: String,
}

impl PolicyStatement {
    /// Build an `Allow` statement. Deny statements are never synthesized;
    /// a missing statement is the deny.
    pub fn allow(action: PolicyAction, resource: impl Into<String>) -> Self {
        Self {
            action,
            effect: Effect::Allow,
            resource: resource.into(),
        }
    }
}

/// A versioned list of statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }
}

/// The decision returned to the gateway for one connection attempt.
///
/// Invariant: when `is_authenticated` is false, `password` is `None` and
/// every document's statement list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    /// Echo of the stored credential. Present only on success.
    pub password: Option<String>,
    pub is_authenticated: bool,
    pub principal_id: String,
    pub disconnect_after_in_seconds: u64,
    pub refresh_after_in_seconds: u64,
    pub policy_documents: Vec<PolicyDocument>,
}

/// Coarse classification of a decision, used for logging and by callers
/// that only care which terminal state was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Authenticated,
    Denied,
}

impl PolicyDecision {
    pub fn outcome(&self) -> DecisionOutcome {
        if self.is_authenticated {
            DecisionOutcome::Authenticated
        } else {
            DecisionOutcome::Denied
        }
    }

    /// All statements across every policy document, in order.
    pub fn statements(&self) -> impl Iterator<Item = &PolicyStatement> {
        self.policy_documents.iter().flat_map(|d| d.statement.iter())
    }
}
