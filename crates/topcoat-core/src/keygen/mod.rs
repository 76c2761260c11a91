//! Distributed key generation
//!
//! Two commit-then-reveal rounds: first over the seeds of the shared
//! matrix `A`, then over each party's contribution `t = A·s1 + s2`.

mod dkg;

pub use dkg::run_keygen;

use crate::ring::{sampling, PolyMatrix};
use crate::types::MatrixSeed;
use crate::ParameterSet;

/// Expand the `K × L` public matrix from its seed
pub fn expand_public_matrix(params: &ParameterSet, seed: &MatrixSeed) -> PolyMatrix {
    sampling::matrix_from_seed(seed, params.k, params.l, params.n, params.q)
}
