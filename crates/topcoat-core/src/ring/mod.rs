//! Polynomial ring arithmetic over `Z_q[X]/(X^N + 1)`
//!
//! Modulus and dimension are runtime values taken from the
//! [`ParameterSet`](crate::ParameterSet), so every element carries its
//! modulus. Coefficients are always stored in canonical form `[0, q)`;
//! norm checks look at the centered representative in `(-q/2, q/2]`.

mod poly;
pub mod sampling;
mod vector;

pub use poly::Poly;
pub use vector::{PolyMatrix, PolyVec};

/// Bytes used to serialize one coefficient
pub const COEFF_BYTES: usize = 4;

/// Reduce `x` into the symmetric range `(-m/2, m/2]`.
pub fn centered_modulo(x: i64, m: i64) -> i64 {
    let r = x.rem_euclid(m);
    if r > m >> 1 {
        r - m
    } else {
        r
    }
}

/// Floor of `a / b` for positive `b`.
pub fn floor_division(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

/// Integer power
pub fn pow(base: i64, exp: u32) -> i64 {
    base.pow(exp)
}

/// Split `r` into `(r1, r0)` with `r = r1·alpha + r0 (mod q)` and
/// `r0` centered modulo `alpha`.
///
/// When `r - r0 == q - 1` the high part wraps to zero and `r0` is shifted
/// down by one.
pub(crate) fn decompose(r: i64, alpha: i64, q: i64) -> (i64, i64) {
    let r = r.rem_euclid(q);
    let r0 = centered_modulo(r, alpha);
    let high = r - r0;
    if high == q - 1 {
        (0, r0 - 1)
    } else {
        (high / alpha, r0)
    }
}
