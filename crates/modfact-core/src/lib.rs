//! # modfact-core
//!
//! Shared library for modfact containing the modular arithmetic primitives,
//! range partitioning, roster parsing, and the binary wire codec.
//!
//! This crate is used by both the server and client applications.
//! It has zero dependencies on async runtimes, file systems, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! modfact computes `k! mod m` across several machines.  A client splits the
//! range `[1, k]` into one slice per server; every server splits its slice
//! again across a pool of local workers; partial products flow back up and
//! are multiplied together modulo `m`.
//!
//! This crate (`modfact-core`) is the shared foundation.  It defines:
//!
//! - **`arith`** – Overflow-safe modular multiplication and the sequential
//!   range product that every worker runs.
//!
//! - **`domain`** – Pure data types with no I/O: the inclusive [`Range`], the
//!   partitioner that splits it into near-equal slices, and the
//!   [`ServerEndpoint`] roster entries.
//!
//! - **`protocol`** – How bytes travel over the network.  A request is three
//!   64-bit words (24 bytes) and a response is one 64-bit word (8 bytes).

pub mod arith;
pub mod domain;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `modfact_core::Range` instead of `modfact_core::domain::range::Range`.
pub use arith::{mod_mul, reduce_range};
pub use domain::range::{partition, Range, ValidationError};
pub use domain::roster::{
    parse_roster, EndpointParseError, ParsedRoster, RosterLineError, ServerEndpoint,
};
pub use protocol::{ComputeRequest, ComputeResponse, ProtocolError, REQUEST_SIZE, RESPONSE_SIZE};
