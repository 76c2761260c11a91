use super::expand_public_matrix;
use crate::error::{proceed, AbortReason, Outcome, Step};
use crate::hashes::{self, digests_match};
use crate::ring::sampling::{self, SEED_BYTES};
use crate::ring::PolyVec;
use crate::transport::{expect_message, Message, Peer, Transport};
use crate::types::{KeyPair, MatrixSeed, PrivateKeyShare, PublicKey};
use crate::{Error, ParameterSet, Result};
use rand::rngs::OsRng;
use rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, instrument};

/// Run distributed key generation with the peer on the other end of
/// `transport`.
///
/// Both parties end with the same [`PublicKey`] and their own
/// [`PrivateKeyShare`]. A failed hash check on either reveal aborts the
/// run on both sides; nothing is retried.
#[instrument(skip_all, fields(party = %party))]
pub async fn run_keygen<T: Transport + ?Sized>(
    params: &ParameterSet,
    transport: &T,
    party: &str,
) -> Result<Outcome<KeyPair>> {
    params.validate()?;
    info!(n = params.n, k = params.k, l = params.l, "Starting keygen");

    match keygen(params, &Peer::new(transport)).await? {
        Step::Continue(key_pair) => {
            info!(
                seed = hex::encode(key_pair.public_key.seed),
                "Keygen completed successfully"
            );
            Ok(Outcome::Completed(key_pair))
        }
        Step::Abort(reason) => Ok(Outcome::Aborted(reason)),
        Step::Restart => Err(Error::UnexpectedMessage {
            expected: "keygen message",
            received: "Control(Restart)",
        }),
    }
}

async fn keygen<T: Transport + ?Sized>(
    params: &ParameterSet,
    peer: &Peer<'_, T>,
) -> Result<Step<KeyPair>> {
    let mut rng = ChaCha20Rng::from_rng(OsRng)?;

    debug!("Keygen: seed commitment");
    let mut my_seed = [0u8; SEED_BYTES];
    rng.fill_bytes(&mut my_seed);

    peer.send(Message::SeedCommit(hashes::h1(&my_seed))).await?;
    let their_seed_hash = expect_message!(
        proceed!(peer.receive().await?),
        "SeedCommit",
        Message::SeedCommit(digest) => digest
    );

    peer.send(Message::SeedReveal(my_seed)).await?;
    let their_seed = expect_message!(
        proceed!(peer.receive().await?),
        "SeedReveal",
        Message::SeedReveal(seed) => seed
    );

    let seed_ok = digests_match(&hashes::h1(&their_seed), &their_seed_hash);
    proceed!(peer.confirm(seed_ok, AbortReason::SeedHashMismatch).await?);

    let seed: MatrixSeed = std::array::from_fn(|i| my_seed[i] ^ their_seed[i]);
    let a = expand_public_matrix(params, &seed);
    debug!(seed = hex::encode(seed), "Keygen: expanded A");

    let s1 = sampling::bounded_vector(&mut rng, params.l, params.eta, params.n, params.q);
    let s2 = sampling::bounded_vector(&mut rng, params.k, params.eta, params.n, params.q);
    let t_mine = &a.mul_vec(&s1) + &s2;
    let t_bytes = t_mine.to_bytes();

    debug!("Keygen: t commitment");
    peer.send(Message::TCommit(hashes::h2(&t_bytes))).await?;
    let their_t_hash = expect_message!(
        proceed!(peer.receive().await?),
        "TCommit",
        Message::TCommit(digest) => digest
    );

    peer.send(Message::TReveal(t_bytes)).await?;
    let their_t_bytes = expect_message!(
        proceed!(peer.receive().await?),
        "TReveal",
        Message::TReveal(bytes) => bytes
    );

    let t_ok = digests_match(&hashes::h2(&their_t_bytes), &their_t_hash);
    proceed!(peer.confirm(t_ok, AbortReason::THashMismatch).await?);

    let their_t = PolyVec::from_bytes(&their_t_bytes, params.k, params.n, params.q)
        .map_err(|e| Error::Malformed(format!("peer t: {}", e)))?;

    let (t1, _) = (&t_mine + &their_t).power2round(params.d);

    Ok(Step::Continue(KeyPair {
        public_key: PublicKey { seed, t1 },
        share: PrivateKeyShare {
            seed,
            their_t,
            s1,
            s2,
        },
    }))
}
