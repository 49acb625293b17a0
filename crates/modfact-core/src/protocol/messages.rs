//! Wire message definitions for the compute exchange.
//!
//! A client sends one [`ComputeRequest`] and the server answers with one
//! [`ComputeResponse`].  The pair may repeat any number of times on the same
//! TCP connection until the client closes it.
//!
//! ```text
//! request   [begin:8][end:8][modulus:8]   24 bytes
//! response  [result:8]                     8 bytes
//! ```

use crate::domain::range::{Range, ValidationError};

/// Encoded size of a [`ComputeRequest`] in bytes.
pub const REQUEST_SIZE: usize = 24;

/// Encoded size of a [`ComputeResponse`] in bytes.
pub const RESPONSE_SIZE: usize = 8;

/// Asks a server for the product of `[begin, end]` modulo `modulus`.
///
/// The fields are raw wire values; call [`ComputeRequest::validate`] before
/// computing anything from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeRequest {
    pub begin: u64,
    pub end: u64,
    pub modulus: u64,
}

impl ComputeRequest {
    /// Builds a request for an already-validated range.
    pub fn for_range(range: Range, modulus: u64) -> Self {
        Self {
            begin: range.begin(),
            end: range.end(),
            modulus,
        }
    }

    /// Checks `1 <= begin <= end` and `modulus > 0`, returning the range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] that applies.
    pub fn validate(&self) -> Result<Range, ValidationError> {
        if self.modulus == 0 {
            return Err(ValidationError::ZeroModulus);
        }
        Range::new(self.begin, self.end)
    }
}

/// The server's answer: the requested product modulo the modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeResponse {
    pub result: u64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let req = ComputeRequest {
            begin: 1,
            end: 10,
            modulus: 97,
        };
        assert_eq!(req.validate(), Ok(Range::new(1, 10).unwrap()));
    }

    #[test]
    fn test_validate_rejects_zero_begin() {
        let req = ComputeRequest {
            begin: 0,
            end: 10,
            modulus: 97,
        };
        assert_eq!(req.validate(), Err(ValidationError::ZeroBegin { end: 10 }));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let req = ComputeRequest {
            begin: 5,
            end: 4,
            modulus: 97,
        };
        assert!(matches!(
            req.validate(),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_modulus() {
        let req = ComputeRequest {
            begin: 1,
            end: 4,
            modulus: 0,
        };
        assert_eq!(req.validate(), Err(ValidationError::ZeroModulus));
    }

    #[test]
    fn test_for_range_copies_bounds() {
        let req = ComputeRequest::for_range(Range::new(3, 8).unwrap(), 11);
        assert_eq!(
            req,
            ComputeRequest {
                begin: 3,
                end: 8,
                modulus: 11
            }
        );
    }
}
