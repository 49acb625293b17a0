//! TOML-based configuration for the server.
//!
//! An optional file supplies defaults that command-line flags override:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 20001
//! thread_count = 4
//! log_level = "info"
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent, so a partial file (or no file at
//! all) still produces a complete configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `bind_address` is not an IP address.
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    /// Port 0 would bind an ephemeral port nobody can find in the roster.
    #[error("port must be between 1 and 65535")]
    InvalidPort,

    /// At least one worker is required.
    #[error("thread count must be at least 1")]
    InvalidThreadCount,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
}

/// The `[server]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerSection {
    /// IP address to listen on.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of workers each request is split across.
    #[serde(default = "default_thread_count")]
    pub thread_count: usize,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    20001
}
fn default_thread_count() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

/// Validated runtime settings for [`crate::infrastructure::FactorialServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,
    /// Workers per request.
    pub thread_count: usize,
}

impl ServerSection {
    /// Checks the section and converts it into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparsable address, port 0, or a zero
    /// thread count.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.bind_address.clone()))?;
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.thread_count == 0 {
            return Err(ConfigError::InvalidThreadCount);
        }
        Ok(ServerConfig {
            bind_addr: SocketAddr::new(ip, self.port),
            thread_count: self.thread_count,
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads a [`FileConfig`] from `path`.
///
/// Unlike a per-user settings file, this path was named explicitly on the
/// command line, so a missing file is an error rather than a silent default.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: FileConfig = toml::from_str(&content)?;
    Ok(cfg)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
