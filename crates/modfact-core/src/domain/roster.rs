//! Server roster entries and the line-oriented roster format.
//!
//! A roster is plain text with one `host:port` entry per line:
//!
//! ```text
//! # rack A
//! 10.0.0.11:20001
//! 10.0.0.12:20001
//!
//! worker-3.lan:20002
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.  A malformed line is
//! reported and skipped; one bad entry never discards the rest of the roster.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// Why a single `host:port` entry could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointParseError {
    /// The entry has no `:` separating host and port.
    #[error("expected host:port")]
    MissingSeparator,

    /// Nothing precedes the `:`.
    #[error("host is empty")]
    EmptyHost,

    /// The port is not an integer in `1..=65535`.
    #[error("invalid port '{0}' (expected 1-65535)")]
    InvalidPort(String),
}

/// A roster line that was skipped, with its 1-based line number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("roster line {line_number} '{line}': {reason}")]
pub struct RosterLineError {
    pub line_number: usize,
    pub line: String,
    #[source]
    pub reason: EndpointParseError,
}

/// One worker server the client can contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerEndpoint {
    /// Hostname or IP address, resolved at connect time.
    pub host: String,
    /// TCP port, never zero.
    pub port: u16,
}

impl ServerEndpoint {
    /// Creates an endpoint, rejecting an empty host or port 0.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointParseError::EmptyHost`] or
    /// [`EndpointParseError::InvalidPort`].
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, EndpointParseError> {
        let host = host.into();
        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost);
        }
        if port == 0 {
            return Err(EndpointParseError::InvalidPort(port.to_string()));
        }
        Ok(Self { host, port })
    }
}

impl FromStr for ServerEndpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .split_once(':')
            .ok_or(EndpointParseError::MissingSeparator)?;
        let host = host.trim();
        let port_text = port.trim();
        let port: u16 = port_text
            .parse()
            .map_err(|_| EndpointParseError::InvalidPort(port_text.to_string()))?;
        Self::new(host, port)
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// The result of parsing a whole roster: valid endpoints in file order, and
/// every line that was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    pub endpoints: Vec<ServerEndpoint>,
    pub rejected: Vec<RosterLineError>,
}

/// Parses roster text, skipping (and logging) malformed lines.
///
/// # Examples
///
/// ```rust
/// use modfact_core::parse_roster;
///
/// let roster = parse_roster("# comment\nlocalhost:20001\nbroken\n\nhost-b:20002\n");
/// assert_eq!(roster.endpoints.len(), 2);
/// assert_eq!(roster.rejected.len(), 1);
/// assert_eq!(roster.rejected[0].line_number, 3);
/// ```
pub fn parse_roster(text: &str) -> ParsedRoster {
    let mut roster = ParsedRoster::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.parse::<ServerEndpoint>() {
            Ok(endpoint) => roster.endpoints.push(endpoint),
            Err(reason) => {
                let rejected = RosterLineError {
                    line_number: idx + 1,
                    line: line.to_string(),
                    reason,
                };
                warn!("skipping {rejected}");
                roster.rejected.push(rejected);
            }
        }
    }

    roster
}

// ── Tests ─────────────────────────────────────────────────────────────────────
