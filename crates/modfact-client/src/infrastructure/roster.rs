//! Loads the server roster file.
//!
//! The file lists one `host:port` per line.  Blank lines and lines starting
//! with `#` are ignored; malformed lines are logged and skipped by
//! [`modfact_core::parse_roster`].

use std::path::{Path, PathBuf};

use modfact_core::{parse_roster, ServerEndpoint};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("cannot read server list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file had no usable entry; `rejected` counts malformed lines.
    #[error("server list {path} contains no valid host:port entry ({rejected} malformed line(s))")]
    Empty { path: PathBuf, rejected: usize },
}

/// Reads and parses the roster at `path`, preserving file order.
///
/// # Errors
///
/// Returns [`RosterError::Io`] if the file cannot be read and
/// [`RosterError::Empty`] if no line yields an endpoint.
pub fn load_roster(path: &Path) -> Result<Vec<ServerEndpoint>, RosterError> {
    let text = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_roster(&text);
    if parsed.endpoints.is_empty() {
        return Err(RosterError::Empty {
            path: path.to_path_buf(),
            rejected: parsed.rejected.len(),
        });
    }

    info!(
        "loaded {} server(s) from {}",
        parsed.endpoints.len(),
        path.display()
    );
    Ok(parsed.endpoints)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
