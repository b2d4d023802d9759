//! Disclosure CLI - run contract operations against a ledger snapshot file
//!
//! Each invocation loads the snapshot, runs one operation inside one
//! transaction on behalf of `--org`, commits on success, and rewrites the
//! file unless another invocation rewrote it first. Results are printed to
//! stdout as JSON; logs go to stderr.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use disclosure_contract::DisclosureContract;
use disclosure_ledger::LedgerTransaction;
use disclosure_types::{OrgId, RecordDraft, RecordId, RecordState};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod store;

use config::CliConfig;

const DEFAULT_LEDGER_PATH: &str = "disclosure-ledger.json";

/// Disclosure CLI
#[derive(Parser)]
#[command(name = "disclosure")]
#[command(about = "Disclosure - multi-party approval of disclosure records", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DISCLOSURE_CONFIG")]
    config: Option<String>,

    /// Organization invoking the operation
    #[arg(short, long, env = "DISCLOSURE_ORG")]
    org: Option<String>,

    /// Ledger snapshot file
    #[arg(short, long, env = "DISCLOSURE_LEDGER")]
    ledger: Option<PathBuf>,

    /// Transaction timestamp (RFC 3339); defaults to now
    #[arg(long)]
    timestamp: Option<DateTime<Utc>>,

    /// Log level
    #[arg(long, env = "DISCLOSURE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "DISCLOSURE_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Register a bank in the org directory (government only)
    RegisterBank {
        /// Organization id of the bank
        org_id: String,
        /// Display name
        name: String,
    },

    /// Submit a new disclosure record
    Submit {
        id: String,
        #[arg(long, default_value = "")]
        data_hash: String,
        #[arg(long, default_value = "")]
        explanation: String,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long, default_value = "")]
        offshore_diagram_url: String,
        #[arg(long, default_value = "")]
        network_diagram_url: String,
    },

    /// Verify a submitted record (government only)
    GovVerify { id: String },

    /// Approve a verified record
    Vote { id: String },

    /// List records in a lifecycle state (submitted, gov-verified, official)
    Query { state: RecordState },

    /// Show one record
    Read { id: String },

    /// Show the org directory
    Directory,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let contract = DisclosureContract::new(config.contract.clone())?;
    let path = cli
        .ledger
        .clone()
        .or_else(|| config.ledger_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH));

    let ledger = store::load(&path)?;
    let loaded_sequence = ledger.sequence()?;
    let caller = OrgId::new(cli.org.clone().unwrap_or_default());
    let mut tx = ledger.begin(caller, cli.timestamp.unwrap_or_else(Utc::now));

    let output = run(&contract, &mut tx, cli.command)?;

    let pending = tx.pending_keys();
    let sequence = tx.commit()?;
    if !pending.is_empty() {
        store::save(&path, &ledger, loaded_sequence)?;
        debug!(sequence, keys = ?pending, ledger = %path.display(), "Ledger written");
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(
    contract: &DisclosureContract,
    tx: &mut LedgerTransaction<'_>,
    command: Commands,
) -> Result<Value> {
    let output = match command {
        Commands::RegisterBank { org_id, name } => {
            serde_json::to_value(contract.register_bank(tx, OrgId::new(org_id), &name)?)?
        }
        Commands::Submit {
            id,
            data_hash,
            explanation,
            summary,
            offshore_diagram_url,
            network_diagram_url,
        } => {
            let draft = RecordDraft::new(RecordId::new(id))
                .with_data_hash(data_hash)
                .with_explanation(explanation)
                .with_summary(summary)
                .with_offshore_diagram_url(offshore_diagram_url)
                .with_network_diagram_url(network_diagram_url);
            serde_json::to_value(contract.submit(tx, draft)?)?
        }
        Commands::GovVerify { id } => {
            serde_json::to_value(contract.gov_verify(tx, &RecordId::new(id))?)?
        }
        Commands::Vote { id } => serde_json::to_value(contract.vote(tx, &RecordId::new(id))?)?,
        Commands::Query { state } => {
            let records = match state {
                RecordState::Submitted => contract.query_submitted(&*tx)?,
                RecordState::GovVerified => contract.query_gov_verified(&*tx)?,
                RecordState::Official => contract.query_official(&*tx)?,
            };
            serde_json::to_value(records)?
        }
        Commands::Read { id } => {
            serde_json::to_value(contract.read_record(&*tx, &RecordId::new(id))?)?
        }
        Commands::Directory => serde_json::to_value(contract.read_org_directory(&*tx)?)?,
    };
    Ok(output)
}
