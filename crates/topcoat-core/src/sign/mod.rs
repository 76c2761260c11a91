//! Distributed signing
//!
//! Each outer iteration commits to `PARALLEL_SESSIONS` candidates per
//! party, runs the rejection test on every cross pair, and keeps the first
//! pair both parties accept. No accepted pair means a restart with fresh
//! randomness.

mod candidates;
mod dsg;

pub use dsg::run_sign;

use crate::hashes::{self, Digest32};
use crate::ring::{pow, Poly, PolyMatrix, PolyVec};
use crate::ParameterSet;

/// `H4(message ‖ pk)`, the seed of the session's commitment key
pub(crate) fn commitment_key_seed(message: &[u8], pk_bytes: &[u8]) -> Digest32 {
    let mut data = Vec::with_capacity(message.len() + pk_bytes.len());
    data.extend_from_slice(message);
    data.extend_from_slice(pk_bytes);
    hashes::h4(&data)
}

/// `H0(message ‖ c1 ‖ c2 ‖ pk)`
pub(crate) fn challenge(
    params: &ParameterSet,
    message: &[u8],
    c1: &PolyVec,
    c2: &PolyVec,
    pk_bytes: &[u8],
) -> Poly {
    let mut data = message.to_vec();
    c1.write_bytes(&mut data);
    c2.write_bytes(&mut data);
    data.extend_from_slice(pk_bytes);
    hashes::h0(params, &data)
}

/// `HighBits(A·z - t·c, 2·GAMMA_PRIME)`
pub(crate) fn rounded_response(
    params: &ParameterSet,
    a: &PolyMatrix,
    z: &PolyVec,
    t: &PolyVec,
    c: &Poly,
) -> PolyVec {
    (&a.mul_vec(z) - &t.scale_by_poly(c)).high_bits(params.high_bits_alpha())
}

/// `t1·2^D`, the public key term subtracted from `A·z`
pub(crate) fn scaled_t1(params: &ParameterSet, t1: &PolyVec) -> PolyVec {
    t1.scale(pow(2, params.d))
}
