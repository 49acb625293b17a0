//! modfact client entry point.
//!
//! Computes `k! mod m` by splitting `[1, k]` across every server listed in a
//! roster file and multiplying their partial results.
//!
//! # Usage
//!
//! ```text
//! modfact-client --k <K> --mod <M> --servers <PATH> [--timeout-secs <S>]
//! ```
//!
//! The roster holds one `host:port` per line; `#` starts a comment line.
//! Unreachable servers are reported as warnings and their ranges are left out
//! of the printed value.  Set `RUST_LOG=debug` for per-request detail.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use modfact_client::application::FactorialClient;
use modfact_client::infrastructure::{load_roster, TcpExchange};

/// modfact client.
#[derive(Debug, Parser)]
#[command(
    name = "modfact-client",
    about = "Computes k! mod m across a set of modfact servers",
    version
)]
struct Cli {
    /// Compute the factorial of this number (at least 1).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    k: u64,

    /// Modulus (at least 1).
    #[arg(long = "mod", value_parser = clap::value_parser!(u64).range(1..))]
    modulus: u64,

    /// Roster file with one host:port per line.
    #[arg(long, env = "MODFACT_SERVERS")]
    servers: PathBuf,

    /// Timeout for each connect, send, and receive step.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Level is overridden by `RUST_LOG`.  Logs go to stderr; stdout carries
    // only the result line.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let roster = load_roster(&cli.servers)
        .with_context(|| format!("failed to load roster from {}", cli.servers.display()))?;

    let client = FactorialClient::new(TcpExchange::new(Duration::from_secs(cli.timeout_secs)));
    let report = client
        .compute(cli.k, cli.modulus, &roster)
        .await
        .with_context(|| format!("failed to compute {}! mod {}", cli.k, cli.modulus))?;

    if !report.is_complete() {
        let missing: Vec<String> = report.skipped().map(|o| o.range.to_string()).collect();
        warn!(
            "result omits range(s) {} from unreachable servers",
            missing.join(", ")
        );
    }

    println!("{}! mod {} = {}", report.k, report.modulus, report.value);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
