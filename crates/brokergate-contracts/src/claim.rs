//! The inbound authorizer envelope sent by the broker gateway.
//!
//! Everything in here is untrusted. Parsing is strict: unknown protocol names
//! fail at deserialization, and [`AuthorizerInput::validate`] rejects the one
//! shape serde cannot, an empty protocol list.

use serde::{Deserialize, Serialize};

use crate::error::{BrokerGateError, BrokerGateResult};

/// Suffix the gateway appends to the MQTT username when the client names the
/// authorizer in its connection string.
pub const AUTHORIZER_NAME_MARKER: &str = "?x-amz-customauthorizer-name";

/// Transport protocols the gateway may report for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tls,
    Mqtt,
}

/// Opaque per-connection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionMetadata {
    /// Gateway session identifier.
    pub id: String,
}

/// The MQTT CONNECT triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MqttData {
    pub username: String,
    /// Base64-encoded password bytes, exactly as the gateway forwards them.
    pub password: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsData {
    pub server_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolData {
    pub mqtt: MqttData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsData>,
}

/// A full authorizer request as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerInput {
    /// Bearer token. Authorizers may be deployed without token auth, so this
    /// is optional.
    #[serde(default)]
    pub token: Option<String>,
    /// Whether the gateway verified the token signature itself.
    #[serde(default)]
    pub signature_verified: Option<bool>,
    pub protocols: Vec<Protocol>,
    pub connection_metadata: ConnectionMetadata,
    pub protocol_data: ProtocolData,
}

impl AuthorizerInput {
    /// Deserialize and validate a raw gateway event.
    ///
    /// Returns `EnvelopeInvalid` for any structural problem, including an
    /// unrecognized protocol name.
    pub fn from_value(value: serde_json::Value) -> BrokerGateResult<Self> {
        let input: Self =
            serde_json::from_value(value).map_err(|e| BrokerGateError::EnvelopeInvalid {
                reason: e.to_string(),
            })?;
        input.validate()?;
        Ok(input)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> BrokerGateResult<()> {
        if self.protocols.is_empty() {
            return Err(BrokerGateError::EnvelopeInvalid {
                reason: "expected a non-empty list of protocols".to_string(),
            });
        }
        Ok(())
    }

    /// Reduce the envelope to the claim the decision engine works on.
    pub fn into_claim(self) -> ConnectionClaim {
        ConnectionClaim {
            client_id: self.protocol_data.mqtt.client_id,
            username: self.protocol_data.mqtt.username,
            password: self.protocol_data.mqtt.password,
            signature_verified: self.signature_verified,
        }
    }
}

/// The identity assertion presented at connection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionClaim {
    pub client_id: String,
    pub username: String,
    /// Base64-encoded credential.
    pub password: String,
    pub signature_verified: Option<bool>,
}

impl ConnectionClaim {
    /// Strip the authorizer-name suffix the gateway appends to usernames.
    ///
    /// The suffix is protocol plumbing; it is never part of the identity.
    pub fn normalize_username(&mut self) {
        if let Some(idx) = self.username.find(AUTHORIZER_NAME_MARKER) {
            self.username.truncate(idx);
        }
    }
}
