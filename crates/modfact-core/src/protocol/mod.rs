//! Protocol module containing the wire messages and their binary codec.

pub mod codec;
pub mod messages;

pub use codec::ProtocolError;
pub use messages::*;
