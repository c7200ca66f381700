//! The trusted identity record held in the credential store.

use serde::{Deserialize, Serialize};

/// Attributes requested from the store for every lookup. Nothing outside
/// this list is read.
pub const IDENTITY_PROJECTION: &[&str] = &[
    "Username",
    "Password",
    "allow_read",
    "allow_connect",
    "allow_write",
    "read_topic",
    "write_topic",
];

/// Name of the key attribute the store is indexed by.
pub const CLIENT_ID_ATTRIBUTE: &str = "Client_ID";

/// One client's credentials and permission flags.
///
/// Field names follow the stored attribute names so a store item can be
/// deserialized directly. `client_id` is not part of the projection; it is
/// filled in from the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(rename = "Client_ID")]
    pub client_id: String,
    #[serde(rename = "Username")]
    pub username: String,
    /// Plaintext at rest.
    #[serde(rename = "Password")]
    pub password: String,
    pub allow_connect: bool,
    pub allow_read: bool,
    pub allow_write: bool,
    /// Topic filter the client may subscribe to and receive from.
    pub read_topic: String,
    /// Topic the client may publish to.
    pub write_topic: String,
}

/// The result of a credential lookup.
///
/// `NotFound` is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(IdentityRecord),
    NotFound,
}
