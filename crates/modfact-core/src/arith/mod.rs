//! Modular arithmetic used by every worker in the system.
//!
//! - [`mod_mul`] – one overflow-safe `(a * b) mod m` step.
//! - [`reduce_range`] – the product of every integer in a [`crate::Range`],
//!   reduced modulo `m`.  This is the unit of work handed to one worker.

pub mod modmul;
pub mod reduce;

pub use modmul::mod_mul;
pub use reduce::reduce_range;
