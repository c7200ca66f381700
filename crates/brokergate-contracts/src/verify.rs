//! Envelope verification report types.
//!
//! Inbound requests and outbound decisions are checked against JSON Schema
//! documents plus a few rules schema cannot express. The result of one check
//! is a `VerificationReport`.

use serde::{Deserialize, Serialize};

use crate::error::{BrokerGateError, BrokerGateResult};

/// The result of checking one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every check passed.
    pub passed: bool,
    /// All failures collected during the run. Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

/// A single failed check within a `VerificationReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Which check failed (`"json-schema"` or a named rule).
    pub rule_id: String,
    /// Human-readable explanation.
    pub message: String,
}

impl VerificationReport {
    pub fn from_failures(failures: Vec<VerificationFailure>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }

    /// One line joining every failure, for error messages.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Convert a failed inbound report into `EnvelopeInvalid`.
    pub fn into_envelope_result(self) -> BrokerGateResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(BrokerGateError::EnvelopeInvalid {
                reason: self.summary(),
            })
        }
    }

    /// Convert a failed outbound report into `SchemaValidation`.
    pub fn into_schema_result(self) -> BrokerGateResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(BrokerGateError::SchemaValidation {
                reason: self.summary(),
            })
        }
    }
}
