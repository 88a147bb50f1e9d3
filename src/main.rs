//! hos-engine - Hours-of-Service compliance engine
//!
//! # Usage
//!
//! ```bash
//! # Serve the JSON API
//! hos-engine serve --addr 0.0.0.0:8080
//!
//! # Evaluate a fleet export once and print the summary
//! hos-engine evaluate --input fleet.json --at 2026-03-08T12:00:00Z
//!
//! # Validate a config file and print the resolved policy
//! hos-engine check-config --config hos_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `HOS_CONFIG`: Path to the TOML config (default: ./hos_config.toml)
//! - `HOS_CORS_ORIGINS`: Comma-separated origins allowed to call the API
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use hos_engine::api::{create_app, ApiState};
use hos_engine::config::{self, HosConfig};
use hos_engine::fleet::evaluate_fleet;
use hos_engine::types::DriverHistory;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "hos-engine")]
#[command(about = "Hours-of-Service compliance engine")]
#[command(version)]
struct CliArgs {
    /// Config file to use instead of the HOS_CONFIG / ./hos_config.toml search
    #[arg(long, global = true, env = "HOS_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the HTTP API
    Serve {
        /// Override the server address from [server] addr
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Evaluate a fleet JSON file and print the summary
    Evaluate {
        /// JSON file: an array of driver histories or {"drivers": [...]}
        #[arg(long)]
        input: PathBuf,

        /// Evaluation instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Validate the config and print the resolved policy
    CheckConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FleetFile {
    Wrapped { drivers: Vec<DriverHistory> },
    Bare(Vec<DriverHistory>),
}

impl FleetFile {
    fn into_drivers(self) -> Vec<DriverHistory> {
        match self {
            FleetFile::Wrapped { drivers } | FleetFile::Bare(drivers) => drivers,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Any config file that exists must load cleanly; defaults apply only when
/// there is none.
fn load_config(path: Option<&Path>) -> Result<HosConfig> {
    match path {
        Some(p) => HosConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => HosConfig::load().context("Failed to load HOS config"),
    }
}

fn read_fleet(path: &Path) -> Result<Vec<DriverHistory>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: FleetFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse fleet JSON in {}", path.display()))?;
    Ok(file.into_drivers())
}

// ============================================================================
// Commands
// ============================================================================

async fn run_serve(addr: Option<String>) -> Result<()> {
    let cfg = config::get();
    let state = ApiState::from_config(cfg).context("Config does not resolve to a valid policy")?;
    let server_addr = addr.unwrap_or_else(|| cfg.server.addr.clone());

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!(
        addr = %server_addr,
        carrier = %cfg.carrier.name,
        cycle = %state.policy.weekly_cycle,
        time_zone = state.policy.time_zone.name(),
        "HTTP server listening"
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}

fn run_evaluate(input: &Path, at: Option<DateTime<Utc>>) -> Result<()> {
    let policy = config::get().policy().context("Config does not resolve to a valid policy")?;
    let drivers = read_fleet(input)?;
    let at = at.unwrap_or_else(Utc::now);
    info!(drivers = drivers.len(), at = %at, "Evaluating fleet file");

    let summary = evaluate_fleet(&drivers, at, &policy);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_check_config() -> Result<()> {
    let cfg = config::get();
    cfg.validate().context("Config validation failed")?;
    let policy = cfg.policy()?;
    println!("Config is valid for carrier '{}'", cfg.carrier.name);
    println!("{}", serde_json::to_string_pretty(&policy)?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    config::init(load_config(args.config.as_deref())?);

    match args.command {
        SubCommand::Serve { addr } => run_serve(addr).await,
        SubCommand::Evaluate { input, at } => run_evaluate(&input, at),
        SubCommand::CheckConfig => run_check_config(),
    }
}
