//! Application layer for the server: the computation itself, independent of
//! sockets and configuration files.

pub mod worker_pool;

pub use worker_pool::{WorkerPool, WorkerPoolError};
