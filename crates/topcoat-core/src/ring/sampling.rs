//! Uniform and bounded sampling of ring elements
//!
//! Seeded variants expand a 32-byte seed through ChaCha20, so both parties
//! (and the verifier) derive identical values from the same seed.

use super::{Poly, PolyMatrix, PolyVec};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Seed length for all deterministic expansions
pub const SEED_BYTES: usize = 32;

pub fn uniform_poly<R: Rng + ?Sized>(rng: &mut R, n: usize, q: i64) -> Poly {
    Poly::from_coeffs((0..n).map(|_| rng.gen_range(0..q)), q)
}

/// Matrix with uniform entries, sampled row by row
pub fn uniform_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    n: usize,
    q: i64,
) -> PolyMatrix {
    let rows = (0..rows)
        .map(|_| PolyVec::from_polys((0..cols).map(|_| uniform_poly(rng, n, q)).collect()))
        .collect();
    PolyMatrix::from_rows(rows)
}

pub fn matrix_from_seed(
    seed: &[u8; SEED_BYTES],
    rows: usize,
    cols: usize,
    n: usize,
    q: i64,
) -> PolyMatrix {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    uniform_matrix(&mut rng, rows, cols, n, q)
}

/// Vector with coefficients uniform in `[-bound, bound]`
pub fn bounded_vector<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    bound: i64,
    n: usize,
    q: i64,
) -> PolyVec {
    let polys = (0..len)
        .map(|_| Poly::from_coeffs((0..n).map(|_| rng.gen_range(-bound..=bound)), q))
        .collect();
    PolyVec::from_polys(polys)
}

pub fn bounded_vector_from_seed(
    seed: &[u8; SEED_BYTES],
    len: usize,
    bound: i64,
    n: usize,
    q: i64,
) -> PolyVec {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    bounded_vector(&mut rng, len, bound, n, q)
}
