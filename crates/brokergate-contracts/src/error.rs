//! Runtime error types for the brokergate decision pipeline.
//!
//! Only failures that prevent a decision from being made are errors. An
//! unknown client or a wrong password is a normal `Denied` decision and never
//! appears here, so a store outage can never be mistaken for "unauthorized".

use thiserror::Error;

/// The unified error type for the brokergate crates.
#[derive(Debug, Error)]
pub enum BrokerGateError {
    /// The inbound gateway envelope is malformed (empty or unknown protocol,
    /// missing fields, wrong types).
    #[error("invalid authorizer envelope: {reason}")]
    EnvelopeInvalid { reason: String },

    /// The backing credential store could not be reached or returned an error.
    #[error("credential store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A stored identity record exists but is missing fields or has fields of
    /// the wrong type.
    #[error("identity record for client '{client_id}' is malformed: {reason}")]
    MalformedRecord { client_id: String, reason: String },

    /// The store handle could not be constructed.
    #[error("store handle setup failed: {reason}")]
    HandleSetup { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A JSON Schema document failed to compile or an outbound document did
    /// not match its schema.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

/// Convenience alias used throughout the brokergate crates.
pub type BrokerGateResult<T> = Result<T, BrokerGateError>;
