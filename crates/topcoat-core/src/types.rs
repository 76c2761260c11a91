//! Key and signature types with their canonical byte layouts

use crate::ring::sampling::SEED_BYTES;
use crate::ring::PolyVec;
use crate::{Error, ParameterSet, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Seed from which the public matrix `A` is expanded
pub type MatrixSeed = [u8; SEED_BYTES];

/// Seed of a party's commitment randomness
pub type RandomnessSeed = [u8; SEED_BYTES];

/// Split `bytes` into consecutive fields of the given lengths, requiring
/// the lengths to cover it exactly.
fn split_fields<'a, const F: usize>(bytes: &'a [u8], lens: [usize; F]) -> Result<[&'a [u8]; F]> {
    let total: usize = lens.iter().sum();
    if bytes.len() != total {
        return Err(Error::Deserialization(format!(
            "expected {} bytes, got {}",
            total,
            bytes.len()
        )));
    }

    let mut fields = [&bytes[..0]; F];
    let mut offset = 0;
    for (field, len) in fields.iter_mut().zip(lens) {
        *field = &bytes[offset..offset + len];
        offset += len;
    }
    Ok(fields)
}

fn seed_from(bytes: &[u8]) -> Result<[u8; SEED_BYTES]> {
    bytes
        .try_into()
        .map_err(|_| Error::Deserialization("Invalid seed length".into()))
}

/// Combined public key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub seed: MatrixSeed,
    /// High part of `t = A·s1 + s2` (both parties' contributions)
    pub t1: PolyVec,
}

impl PublicKey {
    /// `seed ‖ t1`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.seed.to_vec();
        self.t1.write_bytes(&mut out);
        out
    }

    pub fn from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self> {
        let [seed, t1] = split_fields(
            bytes,
            [SEED_BYTES, PolyVec::encoded_len(params.k, params.n)],
        )?;
        Ok(Self {
            seed: seed_from(seed)?,
            t1: PolyVec::from_bytes(t1, params.k, params.n, params.q)?,
        })
    }

    pub fn is_well_formed(&self, params: &ParameterSet) -> bool {
        self.t1.has_shape(params.k, params.n, params.q)
    }
}

/// One party's private key share. Never sent to the peer.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyShare {
    pub seed: MatrixSeed,
    /// The peer's unrounded `t` contribution
    pub their_t: PolyVec,
    pub s1: PolyVec,
    pub s2: PolyVec,
}

impl PrivateKeyShare {
    /// `seed ‖ theirT ‖ s1 ‖ s2`, for local storage only
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.seed.to_vec();
        self.their_t.write_bytes(&mut out);
        self.s1.write_bytes(&mut out);
        self.s2.write_bytes(&mut out);
        out
    }

    pub fn from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self> {
        let (n, q) = (params.n, params.q);
        let [seed, their_t, s1, s2] = split_fields(
            bytes,
            [
                SEED_BYTES,
                PolyVec::encoded_len(params.k, n),
                PolyVec::encoded_len(params.l, n),
                PolyVec::encoded_len(params.k, n),
            ],
        )?;
        Ok(Self {
            seed: seed_from(seed)?,
            their_t: PolyVec::from_bytes(their_t, params.k, n, q)?,
            s1: PolyVec::from_bytes(s1, params.l, n, q)?,
            s2: PolyVec::from_bytes(s2, params.k, n, q)?,
        })
    }

    pub fn is_well_formed(&self, params: &ParameterSet) -> bool {
        let (n, q) = (params.n, params.q);
        self.their_t.has_shape(params.k, n, q)
            && self.s1.has_shape(params.l, n, q)
            && self.s2.has_shape(params.k, n, q)
    }
}

impl std::fmt::Debug for PrivateKeyShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyShare")
            .field("seed", &hex::encode(self.seed))
            .finish_non_exhaustive()
    }
}

/// Output of distributed key generation for one party
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub share: PrivateKeyShare,
}

/// Combined two-party signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub z: PolyVec,
    pub r_seed1: RandomnessSeed,
    pub r_seed2: RandomnessSeed,
    pub c1: PolyVec,
    pub c2: PolyVec,
    pub h1: PolyVec,
    pub h2: PolyVec,
    /// Outer rejection rounds consumed. Not part of the wire form.
    pub iterations: u32,
}

impl Signature {
    /// `z ‖ rSeed1 ‖ rSeed2 ‖ c1 ‖ c2 ‖ h1 ‖ h2`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.z.to_bytes();
        out.extend_from_slice(&self.r_seed1);
        out.extend_from_slice(&self.r_seed2);
        self.c1.write_bytes(&mut out);
        self.c2.write_bytes(&mut out);
        self.h1.write_bytes(&mut out);
        self.h2.write_bytes(&mut out);
        out
    }

    /// Decode the wire form. `iterations` is set to zero.
    pub fn from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self> {
        let (n, q) = (params.n, params.q);
        let [z, r_seed1, r_seed2, c1, c2, h1, h2] = split_fields(
            bytes,
            [
                PolyVec::encoded_len(params.l, n),
                SEED_BYTES,
                SEED_BYTES,
                PolyVec::encoded_len(params.commitment_n_lower, n),
                PolyVec::encoded_len(params.commitment_l, n),
                PolyVec::encoded_len(params.k, n),
                PolyVec::encoded_len(params.k, n),
            ],
        )?;
        Ok(Self {
            z: PolyVec::from_bytes(z, params.l, n, q)?,
            r_seed1: seed_from(r_seed1)?,
            r_seed2: seed_from(r_seed2)?,
            c1: PolyVec::from_bytes(c1, params.commitment_n_lower, n, q)?,
            c2: PolyVec::from_bytes(c2, params.commitment_l, n, q)?,
            h1: PolyVec::from_bytes(h1, params.k, n, q)?,
            h2: PolyVec::from_bytes(h2, params.k, n, q)?,
            iterations: 0,
        })
    }

    pub fn is_well_formed(&self, params: &ParameterSet) -> bool {
        let (n, q) = (params.n, params.q);
        self.z.has_shape(params.l, n, q)
            && self.c1.has_shape(params.commitment_n_lower, n, q)
            && self.c2.has_shape(params.commitment_l, n, q)
            && self.h1.has_shape(params.k, n, q)
            && self.h2.has_shape(params.k, n, q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::sampling;

    fn vector(seed: u8, len: usize, params: &ParameterSet) -> PolyVec {
        sampling::bounded_vector_from_seed(&[seed; 32], len, 100, params.n, params.q)
    }

    fn sample_signature(params: &ParameterSet) -> Signature {
        Signature {
            z: vector(1, params.l, params),
            r_seed1: [2; 32],
            r_seed2: [3; 32],
            c1: vector(4, params.commitment_n_lower, params),
            c2: vector(5, params.commitment_l, params),
            h1: vector(6, params.k, params),
            h2: vector(7, params.k, params),
            iterations: 9,
        }
    }

    #[test]
    fn test_signature_wire_layout() {
        let params = ParameterSet::toy();
        let sig = sample_signature(&params);
        let bytes = sig.to_bytes();

        let z_len = PolyVec::encoded_len(params.l, params.n);
        assert_eq!(&bytes[z_len..z_len + 32], &[2u8; 32]);
        assert_eq!(&bytes[z_len + 32..z_len + 64], &[3u8; 32]);

        let decoded = Signature::from_bytes(&params, &bytes).unwrap();
        assert_eq!(decoded.iterations, 0);
        assert_eq!(decoded, Signature { iterations: 0, ..sig });
    }

    #[test]
    fn test_truncated_signature_is_rejected() {
        let params = ParameterSet::toy();
        let bytes = sample_signature(&params).to_bytes();
        assert!(Signature::from_bytes(&params, &bytes[..bytes.len() - 1]).is_err());
        assert!(Signature::from_bytes(&params, &[]).is_err());
    }

    #[test]
    fn test_public_key_layout() {
        let params = ParameterSet::toy();
        let pk = PublicKey {
            seed: [42; 32],
            t1: vector(8, params.k, &params),
        };
        let bytes = pk.to_bytes();
        assert_eq!(&bytes[..32], &[42u8; 32]);
        assert_eq!(PublicKey::from_bytes(&params, &bytes).unwrap(), pk);
    }

    #[test]
    fn test_share_storage_roundtrip() {
        let params = ParameterSet::toy();
        let share = PrivateKeyShare {
            seed: [1; 32],
            their_t: vector(2, params.k, &params),
            s1: vector(3, params.l, &params),
            s2: vector(4, params.k, &params),
        };
        let decoded = PrivateKeyShare::from_bytes(&params, &share.to_bytes()).unwrap();
        assert_eq!(decoded.to_bytes(), share.to_bytes());
        assert!(decoded.is_well_formed(&params));
        assert!(!format!("{:?}", decoded).contains("s1"));
    }
}
