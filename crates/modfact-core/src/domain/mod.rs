//! Domain types with no I/O: ranges, partitioning, and roster entries.

pub mod range;
pub mod roster;

pub use range::{partition, Range, ValidationError};
pub use roster::{parse_roster, EndpointParseError, ParsedRoster, RosterLineError, ServerEndpoint};
