//! Lattice commitment scheme
//!
//! Keys are derived per signing session from `ck = H4(message ‖ pk)`:
//!
//! ```text
//! A1 = [ I_nlower | A1' ]          (nlower × k)
//! A2 = [ 0 | I_l | A2' ]           (l × k)
//! ```
//!
//! A commitment to `m` with randomness `r` is `(A1·r, A2·r + m)`. Only the
//! seed of `r` ever travels; the opener re-expands it.

use crate::hashes::Digest32;
use crate::ring::sampling::{self, SEED_BYTES};
use crate::ring::{PolyMatrix, PolyVec};
use crate::ParameterSet;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Commitment key pair `(A1, A2)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentKey {
    pub a1: PolyMatrix,
    pub a2: PolyMatrix,
}

/// Commitment outputs `(c1, c2)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    pub c1: PolyVec,
    pub c2: PolyVec,
}

impl CommitmentKey {
    /// Derive the key pair deterministically from `ck`
    pub fn setup(params: &ParameterSet, ck: &Digest32) -> Self {
        let n = params.commitment_n;
        let q = params.commitment_q;
        let width = params.commitment_k;
        let n_lower = params.commitment_n_lower;
        let l = params.commitment_l;

        let mut rng = ChaCha20Rng::from_seed(*ck);
        let a1_prime = sampling::uniform_matrix(&mut rng, n_lower, width - n_lower, n, q);
        let a2_prime = sampling::uniform_matrix(&mut rng, l, width - l - n_lower, n, q);

        let a1 = PolyMatrix::identity(n_lower, n, q).concat(&a1_prime);
        let a2 = PolyMatrix::zero(l, n_lower, n, q)
            .concat(&PolyMatrix::identity(l, n, q))
            .concat(&a2_prime);

        Self { a1, a2 }
    }

    pub fn commit(&self, m: &PolyVec, r: &PolyVec) -> Commitment {
        Commitment {
            c1: self.a1.mul_vec(r),
            c2: &self.a2.mul_vec(r) + m,
        }
    }

    /// Accept iff both equations hold and `‖r‖₂ ≤ COMMITMENT_B2`.
    pub fn open(
        &self,
        params: &ParameterSet,
        commitment: &Commitment,
        m: &PolyVec,
        r: &PolyVec,
    ) -> bool {
        let n = params.commitment_n;
        let q = params.commitment_q;
        let shapes_ok = r.has_shape(params.commitment_k, n, q)
            && m.has_shape(params.commitment_l, n, q)
            && commitment.c1.has_shape(params.commitment_n_lower, n, q)
            && commitment.c2.has_shape(params.commitment_l, n, q);
        if !shapes_ok {
            return false;
        }

        let recomputed = self.commit(m, r);
        let norm_ok = r.second_norm() <= params.commitment_b2 as f64;

        recomputed.c1 == commitment.c1 && recomputed.c2 == commitment.c2 && norm_ok
    }
}

/// Expand a randomness seed into a commitment randomness vector
pub fn randomness_from_seed(params: &ParameterSet, seed: &[u8; SEED_BYTES]) -> PolyVec {
    sampling::bounded_vector_from_seed(
        seed,
        params.commitment_k,
        params.commitment_beta,
        params.commitment_n,
        params.commitment_q,
    )
}
