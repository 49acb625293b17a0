//! Inclusive integer ranges and the deterministic range partitioner.
//!
//! # The partitioning rule
//!
//! Splitting `[begin, end]` into `n` slices works like dealing cards: every
//! slice gets `span / n` elements, and the `span % n` left-over elements go
//! one each to the *first* slices.  For `[1, 10]` split three ways:
//!
//! ```text
//! [1, 4]  [5, 7]  [8, 10]
//!  4 el    3 el    3 el
//! ```
//!
//! Both the client (splitting across servers) and the server (splitting
//! across workers) use this exact rule, so a given request always produces
//! the same assignment.

use std::fmt;

use thiserror::Error;

/// Input rejected before any computation runs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// `begin` is greater than `end`.
    #[error("invalid range [{begin}, {end}]: begin must not exceed end")]
    InvertedRange { begin: u64, end: u64 },

    /// `begin` is zero; 0 is not a factorial term.
    #[error("invalid range [0, {end}]: begin must be at least 1")]
    ZeroBegin { end: u64 },

    /// The modulus is zero.
    #[error("modulus must be greater than 0")]
    ZeroModulus,

    /// A range was asked to be split into zero pieces.
    #[error("cannot partition a range into 0 sub-ranges")]
    ZeroPartitions,
}

/// An inclusive range `[begin, end]` of factorial terms.
///
/// Invariant (enforced by [`Range::new`]): `1 <= begin <= end`.  The span is
/// therefore always at least 1 and never exceeds `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    begin: u64,
    end: u64,
}

impl Range {
    /// Creates a range after checking `1 <= begin <= end`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroBegin`] or
    /// [`ValidationError::InvertedRange`]; a malformed range is never
    /// silently corrected.
    pub fn new(begin: u64, end: u64) -> Result<Self, ValidationError> {
        if begin == 0 {
            return Err(ValidationError::ZeroBegin { end });
        }
        if begin > end {
            return Err(ValidationError::InvertedRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// The range `[1, k]` whose product is `k!`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedRange`] when `k` is zero.
    pub fn factorial(k: u64) -> Result<Self, ValidationError> {
        Self::new(1, k)
    }

    /// First term (inclusive).
    pub fn begin(&self) -> u64 {
        self.begin
    }

    /// Last term (inclusive).
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of terms in the range.  Always at least 1.
    pub fn span(&self) -> u64 {
        // begin >= 1, so this cannot overflow even when end == u64::MAX.
        self.end - self.begin + 1
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.begin, self.end)
    }
}

/// Splits `total` into at most `n` contiguous, near-equal sub-ranges.
///
/// The first `span % n` sub-ranges receive one extra element.  When `n`
/// exceeds the span, the effective count is reduced to the span so every
/// sub-range is non-empty.  The output is ordered and covers `total` exactly
/// once with no gaps or overlaps.
///
/// # Errors
///
/// Returns [`ValidationError::ZeroPartitions`] when `n` is zero.
///
/// # Examples
///
/// ```rust
/// use modfact_core::{partition, Range};
///
/// let parts = partition(Range::new(1, 10).unwrap(), 3).unwrap();
/// let bounds: Vec<_> = parts.iter().map(|r| (r.begin(), r.end())).collect();
/// assert_eq!(bounds, vec![(1, 4), (5, 7), (8, 10)]);
/// ```
pub fn partition(total: Range, n: usize) -> Result<Vec<Range>, ValidationError> {
    if n == 0 {
        return Err(ValidationError::ZeroPartitions);
    }

    let span = total.span();
    let count = (n as u64).min(span);
    let base = span / count;
    let mut remainder = span % count;

    // `count <= n`, so it fits back into a usize.
    let mut parts = Vec::with_capacity(count as usize);
    let mut current = total.begin;
    for _ in 0..count {
        let mut len = base;
        if remainder > 0 {
            len += 1;
            remainder -= 1;
        }
        let end = current + (len - 1);
        parts.push(Range {
            begin: current,
            end,
        });
        // Wraps only after the final slice ending at u64::MAX, where the
        // value is never read again.
        current = end.wrapping_add(1);
    }

    Ok(parts)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
