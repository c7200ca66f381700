//! # brokergate-policy
//!
//! Turns a stored identity and an authentication outcome into the policy
//! decision the broker gateway enforces.
//!
//! ## Overview
//!
//! This crate provides [`IotPolicySynthesizer`], which implements the
//! [`PolicySynthesizer`](brokergate_core::traits::PolicySynthesizer) trait.
//! Each permission flag on the identity record unlocks a fixed set of
//! `Allow` statements; there are no deny statements, a missing statement is
//! the deny.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use brokergate_policy::IotPolicySynthesizer;
//!
//! let synthesizer = IotPolicySynthesizer::from_config(&config);
//! // Pass `synthesizer` to `brokergate_core::Authorizer::new(...)`.
//! ```

pub mod principal;
pub mod synthesizer;

pub use principal::format_principal;
pub use synthesizer::IotPolicySynthesizer;

// ── Tests ─────────────────────────────────────────────────────────────────────
