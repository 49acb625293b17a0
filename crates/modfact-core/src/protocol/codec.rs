//! Binary codec for the compute request and response.
//!
//! Wire format:
//! ```text
//! request   [begin:8][end:8][modulus:8]
//! response  [result:8]
//! ```
//! All integers are little-endian.  The byte order is fixed so that client
//! and server agree regardless of the host architecture either one runs on.

use thiserror::Error;

use crate::protocol::messages::{ComputeRequest, ComputeResponse, REQUEST_SIZE, RESPONSE_SIZE};

/// Errors that can occur while decoding a message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the fixed message size.
    #[error("insufficient data: need {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The byte slice is longer than the fixed message size.
    #[error("trailing data: expected exactly {expected} bytes, got {available}")]
    TrailingData { expected: usize, available: usize },
}

// ── Public API ────────────────────────────────────────────────────────────────

impl ComputeRequest {
    /// Encodes the request into its fixed 24-byte layout.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modfact_core::ComputeRequest;
    ///
    /// let req = ComputeRequest { begin: 1, end: 10, modulus: 97 };
    /// let bytes = req.encode();
    /// assert_eq!(bytes.len(), 24);
    /// assert_eq!(ComputeRequest::decode(&bytes).unwrap(), req);
    /// ```
    pub fn encode(&self) -> [u8; REQUEST_SIZE] {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[0..8].copy_from_slice(&self.begin.to_le_bytes());
        buf[8..16].copy_from_slice(&self.end.to_le_bytes());
        buf[16..24].copy_from_slice(&self.modulus.to_le_bytes());
        buf
    }

    /// Decodes a request from exactly 24 bytes.
    ///
    /// Decoding only checks the length; semantic checks belong to
    /// [`ComputeRequest::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if `bytes` is not exactly 24 bytes long.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        require_exact_len(bytes, REQUEST_SIZE)?;
        Ok(Self {
            begin: read_u64(bytes, 0),
            end: read_u64(bytes, 8),
            modulus: read_u64(bytes, 16),
        })
    }
}

impl ComputeResponse {
    /// Encodes the response into its fixed 8-byte layout.
    pub fn encode(&self) -> [u8; RESPONSE_SIZE] {
        self.result.to_le_bytes()
    }

    /// Decodes a response from exactly 8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if `bytes` is not exactly 8 bytes long.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        require_exact_len(bytes, RESPONSE_SIZE)?;
        Ok(Self {
            result: read_u64(bytes, 0),
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn require_exact_len(bytes: &[u8], expected: usize) -> Result<(), ProtocolError> {
    match bytes.len() {
        n if n < expected => Err(ProtocolError::InsufficientData {
            needed: expected,
            available: n,
        }),
        n if n > expected => Err(ProtocolError::TrailingData {
            expected,
            available: n,
        }),
        _ => Ok(()),
    }
}

/// Reads a little-endian u64 at `offset`.  The caller has checked the length.
fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(word)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout_is_begin_end_modulus_little_endian() {
        // Arrange
        let req = ComputeRequest {
            begin: 0x0102,
            end: 0x0304,
            modulus: 0x0506,
        };

        // Act
        let bytes = req.encode();

        // Assert
        assert_eq!(&bytes[0..2], &[0x02, 0x01]);
        assert_eq!(&bytes[8..10], &[0x04, 0x03]);
        assert_eq!(&bytes[16..18], &[0x06, 0x05]);
        assert!(bytes[2..8].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_request_decode_reads_known_bytes() {
        let mut bytes = [0u8; REQUEST_SIZE];
        bytes[0] = 1;
        bytes[8] = 20;
        bytes[16] = 97;
        let req = ComputeRequest::decode(&bytes).unwrap();
        assert_eq!(
            req,
            ComputeRequest {
                begin: 1,
                end: 20,
                modulus: 97
            }
        );
    }

    #[test]
    fn test_request_decode_short_buffer_is_insufficient_data() {
        let result = ComputeRequest::decode(&[0u8; 23]);
        assert_eq!(
            result,
            Err(ProtocolError::InsufficientData {
                needed: 24,
                available: 23
            })
        );
    }

    #[test]
    fn test_request_decode_long_buffer_is_trailing_data() {
        let result = ComputeRequest::decode(&[0u8; 25]);
        assert_eq!(
            result,
            Err(ProtocolError::TrailingData {
                expected: 24,
                available: 25
            })
        );
    }

    #[test]
    fn test_request_decode_does_not_validate_semantics() {
        // begin = 0 decodes fine; rejecting it is the server's job.
        let req = ComputeRequest::decode(&[0u8; REQUEST_SIZE]).unwrap();
        assert_eq!(req.begin, 0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_encodes_extreme_values() {
        for value in [0u64, 1, 3_628_800, u64::MAX] {
            let bytes = ComputeResponse { result: value }.encode();
            assert_eq!(bytes, value.to_le_bytes());
            assert_eq!(ComputeResponse::decode(&bytes).unwrap().result, value);
        }
    }

    #[test]
    fn test_response_decode_empty_buffer_is_insufficient_data() {
        assert_eq!(
            ComputeResponse::decode(&[]),
            Err(ProtocolError::InsufficientData {
                needed: 8,
                available: 0
            })
        );
    }
}
