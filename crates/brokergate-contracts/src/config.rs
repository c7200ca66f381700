//! Deployment configuration for the authorizer.
//!
//! Loaded once at process start, either from environment variables or from a
//! TOML file. Every field has a default except the table name, which is only
//! required by connectors that actually open a store.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BrokerGateError, BrokerGateResult};

pub const ENV_DISCONNECT_SECONDS: &str = "DISCONNECT_SECONDS";
pub const ENV_REFRESH_SECONDS: &str = "REFRESH_SECONDS";
pub const ENV_REQUIRE_SIGNATURE_VERIFICATION: &str = "REQUIRE_SIGNATURE_VERIFICATION";
pub const ENV_TABLE_NAME: &str = "DYNAMO_TABLE_NAME";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
pub const ENV_HANDLE_TTL_SECONDS: &str = "HANDLE_TTL_SECONDS";

const DEFAULT_LEASE_SECONDS: u64 = 60 * 60;
const DEFAULT_HANDLE_TTL_SECONDS: u64 = 5 * 60;

/// Authorizer settings.
///
/// Example TOML:
/// ```toml
/// table_name = "mqtt-clients"
/// region = "eu-west-1"
/// account_id = "123456789012"
/// require_signature_verification = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
    /// Seconds until the gateway drops the connection.
    pub disconnect_after_seconds: u64,
    /// Seconds until the gateway asks for a fresh decision.
    pub refresh_after_seconds: u64,
    /// Deny any request whose token signature the gateway did not verify.
    pub require_signature_verification: bool,
    /// Backing table holding identity records.
    pub table_name: Option<String>,
    /// Region and account are only used to build resource names.
    pub region: String,
    pub account_id: String,
    /// Lifetime of the cached store handle.
    pub handle_ttl_seconds: u64,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            disconnect_after_seconds: DEFAULT_LEASE_SECONDS,
            refresh_after_seconds: DEFAULT_LEASE_SECONDS,
            require_signature_verification: false,
            table_name: None,
            region: String::new(),
            account_id: String::new(),
            handle_ttl_seconds: DEFAULT_HANDLE_TTL_SECONDS,
        }
    }
}

impl AuthorizerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> BrokerGateResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults. Values that are set but do not parse
    /// are a `ConfigError`.
    pub fn from_lookup<F>(lookup: F) -> BrokerGateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_DISCONNECT_SECONDS) {
            config.disconnect_after_seconds = parse_seconds(ENV_DISCONNECT_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_REFRESH_SECONDS) {
            config.refresh_after_seconds = parse_seconds(ENV_REFRESH_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_REQUIRE_SIGNATURE_VERIFICATION) {
            config.require_signature_verification =
                parse_flag(ENV_REQUIRE_SIGNATURE_VERIFICATION, &v)?;
        }
        if let Some(v) = lookup(ENV_HANDLE_TTL_SECONDS) {
            config.handle_ttl_seconds = parse_seconds(ENV_HANDLE_TTL_SECONDS, &v)?;
        }
        config.table_name = lookup(ENV_TABLE_NAME).filter(|v| !v.is_empty());
        if let Some(v) = lookup(ENV_REGION) {
            config.region = v;
        }
        if let Some(v) = lookup(ENV_ACCOUNT_ID) {
            config.account_id = v;
        }

        Ok(config)
    }

    /// Parse `s` as a TOML configuration document.
    pub fn from_toml_str(s: &str) -> BrokerGateResult<Self> {
        toml::from_str(s).map_err(|e| BrokerGateError::ConfigError {
            reason: format!("failed to parse authorizer config TOML: {}", e),
        })
    }

    /// Read and parse the TOML configuration file at `path`.
    pub fn from_file(path: &Path) -> BrokerGateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| BrokerGateError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The table name, or a `ConfigError` when none is configured.
    pub fn require_table_name(&self) -> BrokerGateResult<&str> {
        self.table_name
            .as_deref()
            .ok_or_else(|| BrokerGateError::ConfigError {
                reason: format!("{} is not set", ENV_TABLE_NAME),
            })
    }
}

fn parse_seconds(key: &str, value: &str) -> BrokerGateResult<u64> {
    value.trim().parse().map_err(|e| BrokerGateError::ConfigError {
        reason: format!("{} must be a whole number of seconds, got '{}': {}", key, value, e),
    })
}

fn parse_flag(key: &str, value: &str) -> BrokerGateResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(BrokerGateError::ConfigError {
            reason: format!("{} must be a boolean, got '{}'", key, value),
        }),
    }
}
