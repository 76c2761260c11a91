//! Single-party signature verification

use crate::commitment::{self, Commitment, CommitmentKey};
use crate::hint::use_hint;
use crate::keygen::expand_public_matrix;
use crate::sign::{challenge, commitment_key_seed, rounded_response, scaled_t1};
use crate::types::{PublicKey, Signature};
use crate::ParameterSet;
use tracing::debug;

/// Check `signature` on `message` under the combined public key.
///
/// Returns `false` for any failure, including a signature or key whose
/// shape does not match `params`.
pub fn verify(
    params: &ParameterSet,
    message: &[u8],
    signature: &Signature,
    public_key: &PublicKey,
) -> bool {
    if params.validate().is_err()
        || !signature.is_well_formed(params)
        || !public_key.is_well_formed(params)
    {
        debug!("Rejecting malformed signature or key");
        return false;
    }

    let pk_bytes = public_key.to_bytes();
    let key = CommitmentKey::setup(params, &commitment_key_seed(message, &pk_bytes));
    let c = challenge(params, message, &signature.c1, &signature.c2, &pk_bytes);
    let a = expand_public_matrix(params, &public_key.seed);

    let w_high = rounded_response(
        params,
        &a,
        &signature.z,
        &scaled_t1(params, &public_key.t1),
        &c,
    );
    let w_high_roof = use_hint(&w_high, &signature.h1, &signature.h2, params.hint_alpha());

    let r = &commitment::randomness_from_seed(params, &signature.r_seed1)
        + &commitment::randomness_from_seed(params, &signature.r_seed2);
    let combined = Commitment {
        c1: signature.c1.clone(),
        c2: signature.c2.clone(),
    };

    key.open(params, &combined, &w_high_roof, &r)
        && !signature.z.check_norm_bound(params.verification_bound())
}

/// Decode a wire-form signature and verify it. Undecodable input is
/// rejected, never an error.
pub fn verify_bytes(
    params: &ParameterSet,
    message: &[u8],
    signature: &[u8],
    public_key: &PublicKey,
) -> bool {
    match Signature::from_bytes(params, signature) {
        Ok(signature) => verify(params, message, &signature, public_key),
        Err(e) => {
            debug!(error = %e, "Rejecting undecodable signature");
            false
        }
    }
}
