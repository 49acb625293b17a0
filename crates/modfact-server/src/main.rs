//! modfact worker server entry point.
//!
//! Listens for compute requests from `modfact-client` and answers each one
//! with the product of the requested range modulo the requested modulus,
//! computed on a local pool of workers.
//!
//! # Usage
//!
//! ```text
//! modfact-server [OPTIONS]
//!
//! Options:
//!   --port   <PORT>   TCP port to listen on            [default: 20001]
//!   --tnum   <N>      Workers per request              [default: 4]
//!   --bind   <IP>     Address to bind                  [default: 0.0.0.0]
//!   --config <PATH>   Optional TOML configuration file
//! ```
//!
//! Command-line flags take precedence over the configuration file, which
//! takes precedence over the built-in defaults.
//!
//! | Variable         | Flag     |
//! |------------------|----------|
//! | `MODFACT_PORT`   | `--port` |
//! | `MODFACT_TNUM`   | `--tnum` |
//! | `MODFACT_BIND`   | `--bind` |
//! | `MODFACT_CONFIG` | `--config` |

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use modfact_server::infrastructure::{load_config, FactorialServer, FileConfig, ServerConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// modfact worker server.
#[derive(Debug, Parser)]
#[command(
    name = "modfact-server",
    about = "Computes modular range products for modfact clients",
    version
)]
struct Cli {
    /// TCP port to listen on (1-65535).
    #[arg(long, env = "MODFACT_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Number of workers each request is split across (at least 1).
    #[arg(long, env = "MODFACT_TNUM")]
    tnum: Option<usize>,

    /// IP address to bind the listener to.
    #[arg(long, env = "MODFACT_BIND")]
    bind: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(long, env = "MODFACT_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Loads the configuration file (if any) and applies CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    fn load_file_config(&self) -> anyhow::Result<FileConfig> {
        let mut file = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => FileConfig::default(),
        };

        if let Some(port) = self.port {
            file.server.port = port;
        }
        if let Some(tnum) = self.tnum {
            file.server.thread_count = tnum;
        }
        if let Some(bind) = &self.bind {
            file.server.bind_address = bind.clone();
        }
        Ok(file)
    }
}

/// Validates the merged configuration.
fn into_server_config(file: &FileConfig) -> anyhow::Result<ServerConfig> {
    file.server
        .to_server_config()
        .context("invalid server configuration")
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file = cli.load_file_config()?;

    // Level is overridden by `RUST_LOG`.  Logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&file.server.log_level)),
        )
        .init();

    let config = into_server_config(&file)?;
    info!(
        "modfact server starting: bind={}, workers={}",
        config.bind_addr, config.thread_count
    );

    let server = FactorialServer::bind(config)
        .await
        .with_context(|| format!("cannot listen on {}", config.bind_addr))?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    server.serve(running).await;

    info!("modfact server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
