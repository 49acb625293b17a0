//! Overflow-safe modular multiplication.
//!
//! # Why not just `(a * b) % m`? (for beginners)
//!
//! Two `u64` values can multiply to a number up to 128 bits wide.  In a
//! release build `a * b` on `u64` silently wraps around, so the remainder
//! would be computed on the wrong number.  Widening both operands to `u128`
//! first makes the product exact; the remainder is then always below `m`
//! and fits back into a `u64`.

/// Returns `(a * b) mod modulus` exactly, for any `a`, `b`, and non-zero
/// `modulus`.
///
/// # Panics
///
/// Panics when `modulus` is zero.  Callers validate the modulus before any
/// arithmetic runs, so reaching this is a programming error rather than bad
/// input.
///
/// # Examples
///
/// ```rust
/// use modfact_core::mod_mul;
///
/// assert_eq!(mod_mul(6, 7, 10), 2);
/// assert_eq!(mod_mul(u64::MAX - 1, u64::MAX - 1, u64::MAX), 1);
/// ```
#[inline]
pub fn mod_mul(a: u64, b: u64, modulus: u64) -> u64 {
    assert!(modulus != 0, "mod_mul called with a zero modulus");
    // The remainder is strictly less than `modulus`, so narrowing is lossless.
    ((u128::from(a) * u128::from(b)) % u128::from(modulus)) as u64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
