//! Domain-separated hash functions
//!
//! Each function prefixes its input with a fixed label and hashes with
//! SHA3-256. [`h0`] additionally expands the digest into a sparse challenge
//! polynomial.

use crate::ring::Poly;
use crate::ParameterSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha3::{Digest, Sha3_256};
use std::collections::HashSet;
use subtle::ConstantTimeEq;

/// 32-byte digest
pub type Digest32 = [u8; 32];

const LABEL_H0: &[u8] = b"Hash0";
const LABEL_H1: &[u8] = b"hash1";
const LABEL_H2: &[u8] = b"hash2";
const LABEL_H3: &[u8] = b"hash3";
const LABEL_H4: &[u8] = b"hash4";

fn labelled(label: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = Sha3_256::new();
    hasher.update(label);
    hasher.update(data);
    hasher.finalize().into()
}

/// Constant-time digest comparison
pub fn digests_match(a: &Digest32, b: &Digest32) -> bool {
    a[..].ct_eq(&b[..]).into()
}

/// Challenge polynomial with exactly `TAU` coefficients in `{-1, 1}`.
///
/// The `N - TAU` zero positions are drawn without replacement from a
/// ChaCha8 stream keyed by the labelled digest; each remaining position
/// then gets a uniform sign.
pub fn h0(params: &ParameterSet, data: &[u8]) -> Poly {
    let mut rng = ChaCha8Rng::from_seed(labelled(LABEL_H0, data));

    let zeros = params.n - params.tau;
    let mut dropped = HashSet::with_capacity(zeros);
    while dropped.len() < zeros {
        dropped.insert(rng.gen_range(0..params.n));
    }

    let coeffs = (0..params.n).map(|i| {
        if dropped.contains(&i) {
            0
        } else if rng.gen::<f64>() > 0.5 {
            -1
        } else {
            1
        }
    });

    Poly::from_coeffs(coeffs, params.q)
}

/// Binds a keygen seed before it is revealed
pub fn h1(data: &[u8]) -> Digest32 {
    labelled(LABEL_H1, data)
}

/// Binds a party's `t` contribution before it is revealed
pub fn h2(data: &[u8]) -> Digest32 {
    labelled(LABEL_H2, data)
}

/// Binds a party's list of candidate commitments
pub fn h3(data: &[u8]) -> Digest32 {
    labelled(LABEL_H3, data)
}

/// Derives the commitment key seed from message and public key
pub fn h4(data: &[u8]) -> Digest32 {
    labelled(LABEL_H4, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(c: &Poly) -> usize {
        c.centered().filter(|&x| x != 0).count()
    }

    #[test]
    fn test_h0_is_sparse_and_ternary() {
        let params = ParameterSet::recommended();
        for i in 0..50u32 {
            let c = h0(&params, &i.to_le_bytes());
            assert_eq!(c.len(), params.n);
            assert_eq!(weight(&c), params.tau);
            assert!(c.centered().all(|x| x == 0 || x == 1 || x == -1));
        }
    }

    #[test]
    fn test_h0_is_deterministic() {
        let params = ParameterSet::toy();
        let a = h0(&params, b"challenge input");
        let b = h0(&params, b"challenge input");
        assert_eq!(a, b);
        assert_eq!(weight(&a), params.tau);
    }

    #[test]
    fn test_h0_depends_on_input() {
        let params = ParameterSet::recommended();
        assert_ne!(h0(&params, b"message one"), h0(&params, b"message two"));
    }

    #[test]
    fn test_labels_separate_domains() {
        let data = b"same bytes";
        let digests = [h1(data), h2(data), h3(data), h4(data)];
        for i in 0..digests.len() {
            for j in (i + 1)..digests.len() {
                assert_ne!(digests[i], digests[j]);
            }
        }
        assert_eq!(h1(data), h1(data));
    }

    #[test]
    fn test_digests_match() {
        let a = h3(b"list");
        let mut b = a;
        assert!(digests_match(&a, &b));
        b[31] ^= 1;
        assert!(!digests_match(&a, &b));
    }
}
