//! brokergate — connection authorizer command line driver.
//!
//! Runs the same pipeline the gateway invokes, against a credential table
//! stored in a JSON file. Useful for checking table entries and reproducing
//! decisions locally.
//!
//! Usage:
//!   cargo run -p brokergate-cli -- validate --event demos/mqtt_auth.json
//!   cargo run -p brokergate-cli -- decide --event demos/mqtt_auth.json --table demos/table.json
//!
//! Without `--table`, the configured `table_name` (DYNAMO_TABLE_NAME) names
//! the table file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use brokergate_contracts::{
    config::AuthorizerConfig,
    error::{BrokerGateError, BrokerGateResult},
    policy::PolicyDecision,
};
use brokergate_core::Authorizer;
use brokergate_policy::IotPolicySynthesizer;
use brokergate_store::JsonFileConnector;
use brokergate_verify::EnvelopeVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// brokergate — per-connection authorization decisions for an MQTT broker.
#[derive(Parser)]
#[command(
    name = "brokergate",
    about = "MQTT broker connection authorizer",
    long_about = "Validates gateway authorizer requests and produces the policy\n\
                  decision the broker would receive for them."
)]
struct Cli {
    /// TOML configuration file. Environment variables are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check an authorizer request envelope without deciding on it.
    Validate {
        /// JSON file holding the gateway event.
        #[arg(long)]
        event: PathBuf,
    },
    /// Decide on an authorizer request and print the response envelope.
    Decide {
        /// JSON file holding the gateway event.
        #[arg(long)]
        event: PathBuf,
        /// JSON file holding the credential table (an array of items).
        /// Defaults to the configured table name.
        #[arg(long)]
        table: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { event } => run_validate(&event),
        Command::Decide { event, table } => run_decide(cli.config.as_deref(), &event, table.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("brokergate error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_validate(event: &Path) -> BrokerGateResult<()> {
    let verifier = EnvelopeVerifier::new()?;
    verifier.parse_request(read_json(event)?)?;
    println!("ok");
    Ok(())
}

fn run_decide(config_path: Option<&Path>, event: &Path, table: Option<&Path>) -> BrokerGateResult<()> {
    let config = match config_path {
        Some(path) => AuthorizerConfig::from_file(path)?,
        None => AuthorizerConfig::from_env()?,
    };
    debug!(?config, "configuration loaded");

    let decision = decide(&config, read_json(event)?, table)?;

    let rendered = serde_json::to_string_pretty(&decision).map_err(|e| {
        BrokerGateError::SchemaValidation {
            reason: format!("decision is not serializable: {}", e),
        }
    })?;
    println!("{}", rendered);
    Ok(())
}

/// Run one verified decision against the table file.
fn decide(
    config: &AuthorizerConfig,
    event: serde_json::Value,
    table: Option<&Path>,
) -> BrokerGateResult<PolicyDecision> {
    let verifier = EnvelopeVerifier::new()?;
    let input = verifier.parse_request(event)?;

    let table = table_path(config, table)?;
    debug!(table = %table.display(), "using credential table");

    let authorizer = Authorizer::new(
        config,
        Box::new(JsonFileConnector::new(table)),
        Box::new(IotPolicySynthesizer::from_config(config)),
    );
    let decision = authorizer.decide_input(input)?;

    verifier.check_response(&decision)?.into_schema_result()?;
    Ok(decision)
}

/// An explicit `--table` wins; otherwise the configured table name is the path.
fn table_path(config: &AuthorizerConfig, table: Option<&Path>) -> BrokerGateResult<PathBuf> {
    match table {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(PathBuf::from(config.require_table_name()?)),
    }
}

fn read_json(path: &Path) -> BrokerGateResult<serde_json::Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| BrokerGateError::EnvelopeInvalid {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| BrokerGateError::EnvelopeInvalid {
        reason: format!("'{}' is not valid JSON: {}", path.display(), e),
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use serde_json::json;

    use brokergate_contracts::{
        config::AuthorizerConfig, error::BrokerGateError, policy::DecisionOutcome,
    };

    use super::{decide, table_path};

    fn event() -> serde_json::Value {
        json!({
            "token": "t",
            "signatureVerified": true,
            "protocols": ["tls", "mqtt"],
            "connectionMetadata": { "id": "conn-1" },
            "protocolData": {
                "mqtt": {
                    "username": "U1?x-amz-customauthorizer-name=brokergate",
                    "password": "UDE=",
                    "clientId": "C1"
                }
            }
        })
    }

    fn table_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let table = json!([{
            "Client_ID": "C1",
            "Username": "U1",
            "Password": "P1",
            "allow_connect": true,
            "allow_read": false,
            "allow_write": false,
            "read_topic": "",
            "write_topic": ""
        }]);
        write!(file, "{}", table).unwrap();
        file
    }

    fn config(table_name: Option<&str>) -> AuthorizerConfig {
        AuthorizerConfig {
            table_name: table_name.map(str::to_string),
            region: "eu-west-1".to_string(),
            account_id: "123456789012".to_string(),
            ..AuthorizerConfig::default()
        }
    }

    #[test]
    fn test_explicit_table_overrides_config() {
        let path = table_path(&config(Some("configured.json")), Some(Path::new("given.json"))).unwrap();
        assert_eq!(path, PathBuf::from("given.json"));
    }

    #[test]
    fn test_table_falls_back_to_configured_name() {
        let path = table_path(&config(Some("configured.json")), None).unwrap();
        assert_eq!(path, PathBuf::from("configured.json"));
    }

    #[test]
    fn test_no_table_anywhere_is_config_error() {
        assert!(matches!(
            table_path(&config(None), None),
            Err(BrokerGateError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_decide_reads_configured_table() {
        let file = table_file();
        let config = config(Some(file.path().to_str().unwrap()));

        let decision = decide(&config, event(), None).unwrap();
        assert_eq!(decision.outcome(), DecisionOutcome::Authenticated);
        assert_eq!(decision.password.as_deref(), Some("P1"));
        assert_eq!(decision.statements().count(), 1);
    }

    #[test]
    fn test_decide_with_unreadable_configured_table_is_setup_error() {
        let config = config(Some("/nonexistent/brokergate/table.json"));
        assert!(matches!(
            decide(&config, event(), None),
            Err(BrokerGateError::HandleSetup { .. })
        ));
    }
}
