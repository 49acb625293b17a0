//! modfact-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! ```text
//! application/     WorkerPool: split a range across local workers, fold results
//! infrastructure/  FactorialServer (TCP accept loop) and TOML configuration
//! ```

pub mod application;
pub mod infrastructure;
