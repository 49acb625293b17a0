//! modfact-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! ```text
//! application/     FactorialClient: partition [1, k], fan out, combine
//! infrastructure/  TcpExchange (one request over TCP) and roster loading
//! ```

pub mod application;
pub mod infrastructure;
