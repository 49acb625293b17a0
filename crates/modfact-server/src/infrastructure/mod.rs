//! Infrastructure layer for the server.
//!
//! Contains OS-facing adapters: the TCP listener and the configuration file
//! loader.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `modfact_core`, but MUST NOT be imported by the `application` layer.

pub mod config;
pub mod listener;

pub use config::{load_config, ConfigError, FileConfig, ServerConfig, ServerSection};
pub use listener::{ConnectionError, FactorialServer, ServerError};
