use crate::commitment::{self, Commitment, CommitmentKey};
use crate::ring::sampling::{self, SEED_BYTES};
use crate::ring::{PolyMatrix, PolyVec};
use crate::transport::CommitmentPair;
use crate::types::RandomnessSeed;
use crate::{Error, ParameterSet, Result};
use rand::rngs::OsRng;
use rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One candidate session of a signing iteration
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct CommitRoundRecord {
    pub y: PolyVec,
    pub w: PolyVec,
    pub w_high: PolyVec,
    pub r_seed: RandomnessSeed,
    #[zeroize(skip)]
    pub commitment: Commitment,
}

impl CommitRoundRecord {
    /// Sample a mask, round `A·y`, and commit to it under fresh randomness.
    ///
    /// Each candidate draws its own stream from the OS so parallel
    /// candidates never share randomness.
    fn generate(params: &ParameterSet, a: &PolyMatrix, key: &CommitmentKey) -> Result<Self> {
        let mut rng = ChaCha20Rng::from_rng(OsRng)?;

        let y = sampling::bounded_vector(&mut rng, params.l, params.gamma - 1, params.n, params.q);
        let w = a.mul_vec(&y);
        let w_high = w.high_bits(params.high_bits_alpha());

        let mut r_seed = [0u8; SEED_BYTES];
        rng.fill_bytes(&mut r_seed);
        let r = commitment::randomness_from_seed(params, &r_seed);
        let commitment = key.commit(&w_high, &r);

        Ok(Self {
            y,
            w,
            w_high,
            r_seed,
            commitment,
        })
    }
}

/// Generate `PARALLEL_SESSIONS` candidates, indexed by candidate number.
#[cfg(feature = "multi-thread")]
pub(crate) fn generate_batch(
    params: &ParameterSet,
    a: &PolyMatrix,
    key: &CommitmentKey,
) -> Result<Vec<CommitRoundRecord>> {
    use rayon::prelude::*;

    (0..params.parallel_sessions)
        .into_par_iter()
        .map(|_| CommitRoundRecord::generate(params, a, key))
        .collect()
}

#[cfg(not(feature = "multi-thread"))]
pub(crate) fn generate_batch(
    params: &ParameterSet,
    a: &PolyMatrix,
    key: &CommitmentKey,
) -> Result<Vec<CommitRoundRecord>> {
    (0..params.parallel_sessions)
        .map(|_| CommitRoundRecord::generate(params, a, key))
        .collect()
}

pub(crate) fn to_wire(commitment: &Commitment) -> CommitmentPair {
    CommitmentPair {
        c1: commitment.c1.to_bytes(),
        c2: commitment.c2.to_bytes(),
    }
}

pub(crate) fn from_wire(params: &ParameterSet, pair: &CommitmentPair) -> Result<Commitment> {
    let (n, q) = (params.commitment_n, params.commitment_q);
    let decode = |bytes: &[u8], len: usize| {
        PolyVec::from_bytes(bytes, len, n, q)
            .map_err(|e| Error::Malformed(format!("peer commitment: {}", e)))
    };
    Ok(Commitment {
        c1: decode(&pair.c1, params.commitment_n_lower)?,
        c2: decode(&pair.c2, params.commitment_l)?,
    })
}

/// Bytes hashed by `H3`: every `c1` in candidate order, then every `c2`
pub(crate) fn commit_list_bytes(pairs: &[CommitmentPair]) -> Vec<u8> {
    let mut out = Vec::new();
    for pair in pairs {
        out.extend_from_slice(&pair.c1);
    }
    for pair in pairs {
        out.extend_from_slice(&pair.c2);
    }
    out
}
