//! # brokergate-contracts
//!
//! Shared types, envelopes, and configuration for the brokergate connection
//! authorizer.
//!
//! All crates in the workspace import from here. No decision logic lives in
//! this crate — only data definitions, wire formats, and error types.

pub mod claim;
pub mod config;
pub mod error;
pub mod identity;
pub mod policy;
pub mod verify;
