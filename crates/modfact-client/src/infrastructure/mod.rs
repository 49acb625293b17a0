//! Infrastructure layer for the client: TCP transport and roster files.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `modfact_core`, but MUST NOT be imported by the `application` layer.

pub mod exchange;
pub mod roster;

pub use exchange::{TcpExchange, DEFAULT_EXCHANGE_TIMEOUT};
pub use roster::{load_roster, RosterError};
