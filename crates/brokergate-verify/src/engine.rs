//! Schema-based envelope verifier.
//!
//! `EnvelopeVerifier` checks both directions of the gateway exchange:
//!
//! 1. **Requests** — the raw event is validated against the request schema,
//!    then strictly deserialized into an `AuthorizerInput`. Any failure is
//!    `EnvelopeInvalid` and the decision engine never sees the request.
//! 2. **Responses** — a `PolicyDecision` is serialized and validated against
//!    the response schema, then checked against the denial rules a schema
//!    cannot express.
//!
//! All failures are collected before returning so operators see the full
//! set in one pass.

use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, warn};

use brokergate_contracts::{
    claim::AuthorizerInput,
    error::{BrokerGateError, BrokerGateResult},
    policy::PolicyDecision,
    verify::{VerificationFailure, VerificationReport},
};

use crate::schema::{request_schema, response_schema};

/// Compiled request and response schemas.
pub struct EnvelopeVerifier {
    request: Validator,
    response: Validator,
}

impl EnvelopeVerifier {
    /// Compile the built-in schemas.
    pub fn new() -> BrokerGateResult<Self> {
        Self::with_schemas(&request_schema(), &response_schema())
    }

    /// Compile caller-supplied schemas.
    ///
    /// Returns `SchemaValidation` if either document is not a valid schema.
    pub fn with_schemas(request: &Value, response: &Value) -> BrokerGateResult<Self> {
        Ok(Self {
            request: compile("request", request)?,
            response: compile("response", response)?,
        })
    }

    /// Run the request schema against a raw event.
    pub fn check_request(&self, event: &Value) -> VerificationReport {
        VerificationReport::from_failures(schema_failures(&self.request, event, "request"))
    }

    /// Validate and parse a raw gateway event.
    pub fn parse_request(&self, event: Value) -> BrokerGateResult<AuthorizerInput> {
        self.check_request(&event).into_envelope_result()?;
        AuthorizerInput::from_value(event)
    }

    /// Run the response schema and denial rules against a decision.
    pub fn check_response(&self, decision: &PolicyDecision) -> BrokerGateResult<VerificationReport> {
        let value = serde_json::to_value(decision).map_err(|e| BrokerGateError::SchemaValidation {
            reason: format!("decision is not serializable: {e}"),
        })?;

        let mut failures = schema_failures(&self.response, &value, "response");
        failures.extend(denial_rule_failures(decision));

        let report = VerificationReport::from_failures(failures);
        debug!(
            passed = report.passed,
            failure_count = report.failures.len(),
            "response verification complete"
        );
        Ok(report)
    }
}

fn compile(which: &str, schema: &Value) -> BrokerGateResult<Validator> {
    jsonschema::validator_for(schema).map_err(|e| BrokerGateError::SchemaValidation {
        reason: format!("invalid {which} schema document: {e}"),
    })
}

fn schema_failures(validator: &Validator, instance: &Value, which: &str) -> Vec<VerificationFailure> {
    validator
        .iter_errors(instance)
        .map(|error| {
            let message = format!("JSON Schema violation at {}: {}", error.instance_path, error);
            warn!(envelope = which, %message, "structural validation failure");
            VerificationFailure {
                rule_id: "json-schema".to_string(),
                message,
            }
        })
        .collect()
}

/// Rules tying the echoed fields to the authenticated flag.
fn denial_rule_failures(decision: &PolicyDecision) -> Vec<VerificationFailure> {
    let mut failures = Vec::new();

    if !decision.is_authenticated {
        if decision.password.is_some() {
            failures.push(VerificationFailure {
                rule_id: "denied-no-echo".to_string(),
                message: "denied decision echoes a password".to_string(),
            });
        }
        if decision.statements().next().is_some() {
            failures.push(VerificationFailure {
                rule_id: "denied-no-statements".to_string(),
                message: "denied decision grants statements".to_string(),
            });
        }
    } else if decision.password.is_none() {
        failures.push(VerificationFailure {
            rule_id: "authenticated-echo".to_string(),
            message: "authenticated decision is missing the password echo".to_string(),
        });
    }

    failures
}

// ── Tests ─────────────────────────────────────────────────────────────────────
