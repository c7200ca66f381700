//! Credential lookup and verification.
//!
//! `fetch` turns a loosely typed store item into a strict `IdentityRecord`;
//! `verify` checks a presented claim against that record.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use brokergate_contracts::{
    claim::ConnectionClaim,
    error::{BrokerGateError, BrokerGateResult},
    identity::{IdentityRecord, Lookup, CLIENT_ID_ATTRIBUTE, IDENTITY_PROJECTION},
};

use crate::traits::CredentialStore;

/// Look up the identity record for `client_id`.
///
/// Only the attributes in `IDENTITY_PROJECTION` are requested, and anything
/// else a store hands back is discarded before parsing. A missing item is
/// `Lookup::NotFound`; an item that does not parse is `MalformedRecord`;
/// store failures propagate unchanged.
pub fn fetch(client_id: &str, store: &dyn CredentialStore) -> BrokerGateResult<Lookup> {
    let Some(mut item) = store.get_item(client_id, IDENTITY_PROJECTION)? else {
        debug!(client_id = %client_id, "no identity record");
        return Ok(Lookup::NotFound);
    };

    item.retain(|attr, _| IDENTITY_PROJECTION.contains(&attr.as_str()));
    item.insert(
        CLIENT_ID_ATTRIBUTE.to_string(),
        serde_json::Value::String(client_id.to_string()),
    );

    let record: IdentityRecord = serde_json::from_value(serde_json::Value::Object(item))
        .map_err(|e| {
            warn!(client_id = %client_id, error = %e, "identity record failed to parse");
            BrokerGateError::MalformedRecord {
                client_id: client_id.to_string(),
                reason: e.to_string(),
            }
        })?;

    Ok(Lookup::Found(record))
}

/// Check `claim` against `record`.
///
/// The claimed password is base64 (standard alphabet, padded) over UTF-8
/// text. Both the username and the decoded password must match exactly;
/// malformed base64 or non-UTF-8 bytes simply fail verification.
pub fn verify(record: &IdentityRecord, claim: &ConnectionClaim) -> bool {
    let Some(presented) = decode_password(&claim.password) else {
        debug!(client_id = %claim.client_id, "presented password is not valid base64 UTF-8");
        return false;
    };

    let username_ok = record.username.as_bytes().ct_eq(claim.username.as_bytes());
    let password_ok = record.password.as_bytes().ct_eq(presented.as_bytes());
    (username_ok & password_ok).into()
}

fn decode_password(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

// ── Tests ────────────────────────────────────────────────────────────────────
