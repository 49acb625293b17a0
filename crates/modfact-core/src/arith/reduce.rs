//! Sequential modular product over one inclusive range.

use crate::arith::modmul::mod_mul;
use crate::domain::range::Range;

/// Multiplies every integer in `range` together, reducing modulo `modulus`
/// after each step.
///
/// The fold starts from `1 % modulus`, so a modulus of 1 always yields 0.
/// The function is pure: concurrent workers can each call it on their own
/// disjoint range without any coordination.
///
/// # Panics
///
/// Panics when `modulus` is zero (see [`mod_mul`]).
///
/// # Examples
///
/// ```rust
/// use modfact_core::{reduce_range, Range};
///
/// let range = Range::new(1, 5).unwrap();
/// assert_eq!(reduce_range(range, 1_000), 120);
/// ```
pub fn reduce_range(range: Range, modulus: u64) -> u64 {
    assert!(modulus != 0, "reduce_range called with a zero modulus");
    let mut acc = 1 % modulus;
    for term in range.begin()..=range.end() {
        // Once the product hits zero it stays zero.
        if acc == 0 {
            break;
        }
        acc = mod_mul(acc, term, modulus);
    }
    acc
}

// ── Tests ─────────────────────────────────────────────────────────────────────
