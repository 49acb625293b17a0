//! Application layer for the client.
//!
//! The fan-out and combine policy lives here and depends only on the
//! [`fan_out::RangeExchange`] trait, so it is testable without sockets.

pub mod fan_out;

pub use fan_out::{
    ClientError, ExchangeError, ExchangeStage, FactorialClient, FactorialReport, RangeExchange,
    ServerOutcome,
};
