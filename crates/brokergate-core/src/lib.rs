//! # brokergate-core
//!
//! The connection decision pipeline for the brokergate authorizer.
//!
//! This crate provides:
//! - The trait seams (`CredentialStore`, `StoreConnector`, `PolicySynthesizer`)
//! - `HandleCache`, the TTL-bounded store handle cache
//! - Credential lookup and verification
//! - The `Authorizer` that wires them together in the correct order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brokergate_core::Authorizer;
//!
//! let authorizer = Authorizer::new(&config, Box::new(connector), Box::new(synthesizer));
//! let decision = authorizer.decide_input(input)?;
//! ```

pub mod authorizer;
pub mod cache;
pub mod credentials;
pub mod traits;

pub use authorizer::Authorizer;
pub use cache::HandleCache;
