//! # brokergate-store
//!
//! Reference credential tables for the brokergate authorizer.
//!
//! ## Overview
//!
//! The production table lives in an external key-value service; this crate
//! provides stand-ins that implement the same
//! [`CredentialStore`](brokergate_core::traits::CredentialStore) contract:
//!
//! - [`InMemoryCredentialStore`] / [`InMemoryConnector`] — a shared
//!   in-process table, seeded with `put_item`.
//! - [`JsonFileConnector`] — loads the table from a JSON file on each
//!   connect.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brokergate_store::JsonFileConnector;
//!
//! let connector = JsonFileConnector::new("clients.json");
//! let authorizer = Authorizer::new(&config, Box::new(connector), Box::new(synthesizer));
//! ```

pub mod file;
pub mod memory;

pub use file::JsonFileConnector;
pub use memory::{InMemoryConnector, InMemoryCredentialStore};

// ── Tests ─────────────────────────────────────────────────────────────────────
