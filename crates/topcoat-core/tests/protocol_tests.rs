mod common;

use common::{keygen_pair, sign_pair};
use topcoat_core::ring::PolyVec;
use topcoat_core::{verify, verify_bytes, ParameterSet, Signature};

#[tokio::test]
async fn test_keygen_agrees_on_public_key() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;

    assert_eq!(alice.public_key, bob.public_key);
    assert_eq!(alice.share.seed, bob.share.seed);
    assert_eq!(alice.share.seed, alice.public_key.seed);
    assert!(alice.share.is_well_formed(&params));
    assert!(!alice.share.s1.check_norm_bound(params.eta + 1));

    // each share holds the other party's unrounded contribution
    let a = topcoat_core::keygen::expand_public_matrix(&params, &alice.share.seed);
    let alice_t = &a.mul_vec(&alice.share.s1) + &alice.share.s2;
    assert_eq!(bob.share.their_t, alice_t);

    let (t1, _) = (&alice_t + &alice.share.their_t).power2round(params.d);
    assert_eq!(alice.public_key.t1, t1);
}

#[tokio::test]
async fn test_sign_roundtrip_toy() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;

    for i in 0..10u32 {
        let message = format!("message number {}", i);
        let (sig_a, sig_b) = sign_pair(&params, &alice, &bob, message.as_bytes()).await;

        assert!(verify(&params, message.as_bytes(), &sig_a, &alice.public_key));
        assert!(verify(&params, message.as_bytes(), &sig_b, &bob.public_key));
        assert_eq!(sig_a.iterations, sig_b.iterations);
        assert!(sig_a.iterations >= 1);
    }
}

#[tokio::test]
async fn test_both_signatures_cross_verify() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;
    let message = b"cross verification";

    let (sig_a, sig_b) = sign_pair(&params, &alice, &bob, message).await;

    // same combined values, seeds in opposite order
    assert_eq!(sig_a.z, sig_b.z);
    assert_eq!(sig_a.c1, sig_b.c1);
    assert_eq!(sig_a.c2, sig_b.c2);
    assert_eq!(sig_a.r_seed1, sig_b.r_seed2);
    assert_eq!(sig_a.r_seed2, sig_b.r_seed1);

    for sig in [&sig_a, &sig_b] {
        for pk in [&alice.public_key, &bob.public_key] {
            assert!(verify(&params, message, sig, pk));
        }
    }
}

#[tokio::test]
async fn test_verify_rejects_other_message_and_key() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;
    let (other, _) = keygen_pair(&params).await;

    let (sig, _) = sign_pair(&params, &alice, &bob, b"signed").await;

    assert!(verify(&params, b"signed", &sig, &alice.public_key));
    assert!(!verify(&params, b"not signed", &sig, &alice.public_key));
    assert!(!verify(&params, b"signed", &sig, &other.public_key));
}

#[tokio::test]
async fn test_verify_bytes_rejects_tampering() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;
    let message = b"tamper me";
    let (sig, _) = sign_pair(&params, &alice, &bob, message).await;

    let bytes = sig.to_bytes();
    assert!(verify_bytes(&params, message, &bytes, &alice.public_key));

    let z_len = PolyVec::encoded_len(params.l, params.n);
    let c1_start = z_len + 64;
    let c2_start = c1_start + PolyVec::encoded_len(params.commitment_n_lower, params.n);
    let h1_start = c2_start + PolyVec::encoded_len(params.commitment_l, params.n);
    let h2_start = h1_start + PolyVec::encoded_len(params.k, params.n);

    // first seed byte, then the low bit of the first coefficient of c1..h2
    for offset in [z_len, c1_start, c2_start, h1_start, h2_start] {
        let mut tampered = bytes.clone();
        tampered[offset] ^= 1;
        assert!(
            !verify_bytes(&params, message, &tampered, &alice.public_key),
            "tampering at byte {} went unnoticed",
            offset
        );
    }
}

#[tokio::test]
async fn test_malformed_input_never_verifies() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;
    let (sig, _) = sign_pair(&params, &alice, &bob, b"shape").await;

    let bytes = sig.to_bytes();
    assert!(!verify_bytes(&params, b"shape", &[], &alice.public_key));
    assert!(!verify_bytes(
        &params,
        b"shape",
        &bytes[..bytes.len() - 3],
        &alice.public_key
    ));

    // a signature checked against the wrong parameter set
    let recommended = ParameterSet::recommended();
    assert!(!verify(&recommended, b"shape", &sig, &alice.public_key));

    let truncated = Signature {
        h2: PolyVec::from_polys(sig.h2.polys()[1..].to_vec()),
        ..sig.clone()
    };
    assert!(!verify(&params, b"shape", &truncated, &alice.public_key));
}

#[tokio::test]
async fn test_signing_terminates_quickly_on_toy_parameters() {
    let params = ParameterSet::toy();
    let (alice, bob) = keygen_pair(&params).await;

    let mut total_iterations = 0u64;
    for trial in 0..1000u32 {
        let message = trial.to_le_bytes();
        let (sig, _) = sign_pair(&params, &alice, &bob, &message).await;

        assert!(
            sig.iterations <= 50,
            "trial {} took {} iterations",
            trial,
            sig.iterations
        );
        assert!(verify(&params, &message, &sig, &alice.public_key));
        total_iterations += sig.iterations as u64;
    }

    assert!(total_iterations < 5000, "mean iterations too high");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sign_roundtrip_recommended() {
    let params = ParameterSet::recommended();
    let (alice, bob) = keygen_pair(&params).await;
    let message = b"recommended parameters";

    let (sig_a, sig_b) = sign_pair(&params, &alice, &bob, message).await;
    assert!(verify(&params, message, &sig_a, &alice.public_key));
    assert!(verify(&params, message, &sig_b, &alice.public_key));
    assert!(!verify(&params, b"another message", &sig_a, &alice.public_key));

    let bytes = sig_a.to_bytes();
    assert!(verify_bytes(&params, message, &bytes, &alice.public_key));

    let z_len = PolyVec::encoded_len(params.l, params.n);
    let c1_start = z_len + 64;
    let c2_start = c1_start + PolyVec::encoded_len(params.commitment_n_lower, params.n);
    let h1_start = c2_start + PolyVec::encoded_len(params.commitment_l, params.n);
    let h2_start = h1_start + PolyVec::encoded_len(params.k, params.n);

    for offset in [0, z_len, z_len + 32, c1_start, c2_start, h1_start, h2_start] {
        let mut tampered = bytes.clone();
        tampered[offset] ^= 1;
        assert!(!verify_bytes(&params, message, &tampered, &alice.public_key));
    }
}
