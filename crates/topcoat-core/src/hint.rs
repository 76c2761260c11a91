//! Hint compression for rounded vectors
//!
//! The signer knows both `r` (what the verifier will recompute) and
//! `r'` (what the commitment was made to). The hint factors their
//! difference as `h1·alpha + h2` with `h2` centered modulo `alpha`, so the
//! verifier recovers `r'` exactly from `r`.

use crate::ring::{centered_modulo, floor_division, Poly, PolyVec};

/// Compute `(h1, h2)` with `r - r' = h1·alpha + h2`.
pub fn make_hint(r: &PolyVec, r_prime: &PolyVec, alpha: i64) -> (PolyVec, PolyVec) {
    debug_assert_eq!(r.len(), r_prime.len(), "vector lengths differ");

    let (h1, h2) = r
        .iter()
        .zip(r_prime.iter())
        .map(|(a, b)| {
            let q = a.modulus();
            let (high, low): (Vec<i64>, Vec<i64>) = a
                .coeffs()
                .iter()
                .zip(b.coeffs())
                .map(|(&x, &y)| {
                    let diff = x - y;
                    let low = centered_modulo(diff, alpha);
                    (floor_division(diff - low, alpha), low)
                })
                .unzip();
            (Poly::from_coeffs(high, q), Poly::from_coeffs(low, q))
        })
        .unzip();

    (PolyVec::from_polys(h1), PolyVec::from_polys(h2))
}

/// Recover `r'` as `r - (h1·alpha + h2)`.
pub fn use_hint(r: &PolyVec, h1: &PolyVec, h2: &PolyVec, alpha: i64) -> PolyVec {
    let h = &h1.scale(alpha) + h2;
    r - &h
}
