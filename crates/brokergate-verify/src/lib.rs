//! # brokergate-verify
//!
//! Envelope verification for the brokergate authorizer.
//!
//! This crate provides [`engine::EnvelopeVerifier`], which checks gateway
//! traffic in both directions:
//!
//! 1. **Requests** — JSON Schema validation via the `jsonschema` crate, then
//!    strict parsing into `AuthorizerInput`.
//! 2. **Responses** — JSON Schema validation of the serialized decision plus
//!    the rules that keep denials free of credentials and statements.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use brokergate_verify::engine::EnvelopeVerifier;
//!
//! let verifier = EnvelopeVerifier::new()?;
//! let input = verifier.parse_request(event)?;
//! let decision = authorizer.decide_input(input)?;
//! verifier.check_response(&decision)?.into_schema_result()?;
//! ```

pub mod engine;
pub mod schema;

pub use engine::EnvelopeVerifier;
