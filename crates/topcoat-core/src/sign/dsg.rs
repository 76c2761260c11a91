use super::candidates::{self, CommitRoundRecord};
use super::{challenge, commitment_key_seed, rounded_response, scaled_t1};
use crate::commitment::{self, Commitment, CommitmentKey};
use crate::error::{proceed, AbortReason, Outcome, Step};
use crate::hashes::{self, digests_match, Digest32};
use crate::hint;
use crate::keygen::expand_public_matrix;
use crate::ring::{Poly, PolyMatrix, PolyVec};
use crate::transport::{expect_message, unexpected, Control, Message, Peer, Transport};
use crate::types::{PrivateKeyShare, PublicKey, RandomnessSeed, Signature};
use crate::{Error, ParameterSet, Result};
use tracing::{debug, info, instrument};

/// Run distributed signing of `message` with the peer on the other end of
/// `transport`.
///
/// Loops until both parties accept a common candidate pair. The returned
/// signature carries this party's randomness seed as `r_seed1`.
#[instrument(skip_all, fields(party = %party))]
pub async fn run_sign<T: Transport + ?Sized>(
    params: &ParameterSet,
    transport: &T,
    public_key: &PublicKey,
    share: &PrivateKeyShare,
    message: &[u8],
    party: &str,
) -> Result<Outcome<Signature>> {
    params.validate()?;
    if !public_key.is_well_formed(params) || !share.is_well_formed(params) {
        return Err(Error::Malformed(
            "key material does not match the parameter set".into(),
        ));
    }

    info!(message_len = message.len(), "Starting signing");

    let session = SigningSession::new(params, public_key, share, message);
    let peer = Peer::new(transport);

    let mut iteration = 0u32;
    loop {
        iteration += 1;
        debug!(iteration, "Starting iteration");

        match session.attempt(&peer, iteration).await? {
            Step::Continue(signature) => {
                info!(iterations = iteration, "Signing completed successfully");
                return Ok(Outcome::Completed(signature));
            }
            Step::Restart => debug!(iteration, "No common candidate, restarting"),
            Step::Abort(reason) => return Ok(Outcome::Aborted(reason)),
        }
    }
}

/// Per-message state, fixed across iterations
struct SigningSession<'a> {
    params: &'a ParameterSet,
    public_key: &'a PublicKey,
    share: &'a PrivateKeyShare,
    message: &'a [u8],
    pk_bytes: Vec<u8>,
    a: PolyMatrix,
    key: CommitmentKey,
}

/// Candidate pair, indexed from this party's viewpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexPair {
    pub their: usize,
    pub mine: usize,
}

/// Rejection test outcome for one cross pair
struct PairEvaluation {
    c1: PolyVec,
    c2: PolyVec,
    challenge: Poly,
    z: PolyVec,
    accepted: bool,
}

impl<'a> SigningSession<'a> {
    fn new(
        params: &'a ParameterSet,
        public_key: &'a PublicKey,
        share: &'a PrivateKeyShare,
        message: &'a [u8],
    ) -> Self {
        let pk_bytes = public_key.to_bytes();
        let key = CommitmentKey::setup(params, &commitment_key_seed(message, &pk_bytes));
        let a = expand_public_matrix(params, &share.seed);

        Self {
            params,
            public_key,
            share,
            message,
            pk_bytes,
            a,
            key,
        }
    }

    async fn attempt<T: Transport + ?Sized>(
        &self,
        peer: &Peer<'_, T>,
        iteration: u32,
    ) -> Result<Step<Signature>> {
        let params = self.params;

        // COMMIT
        let mine = candidates::generate_batch(params, &self.a, &self.key)?;
        debug!(iteration, count = mine.len(), "Committed to candidates");

        // EXCHANGE
        let my_pairs: Vec<_> = mine
            .iter()
            .map(|record| candidates::to_wire(&record.commitment))
            .collect();
        let my_hash = hashes::h3(&candidates::commit_list_bytes(&my_pairs));

        peer.send(Message::CommitListHash(my_hash)).await?;
        let their_hash = expect_message!(
            proceed!(peer.receive().await?),
            "CommitListHash",
            Message::CommitListHash(digest) => digest
        );

        peer.send(Message::CommitList(my_pairs)).await?;
        let their_pairs = expect_message!(
            proceed!(peer.receive().await?),
            "CommitList",
            Message::CommitList(pairs) => pairs
        );
        if their_pairs.len() != params.parallel_sessions {
            return Err(Error::Malformed(format!(
                "expected {} peer commitments, got {}",
                params.parallel_sessions,
                their_pairs.len()
            )));
        }

        let list_ok = digests_match(
            &hashes::h3(&candidates::commit_list_bytes(&their_pairs)),
            &their_hash,
        );
        proceed!(
            peer.confirm(list_ok, AbortReason::CommitListHashMismatch)
                .await?
        );

        let theirs = their_pairs
            .iter()
            .map(|pair| candidates::from_wire(params, pair))
            .collect::<Result<Vec<_>>>()?;
        let i_am_the_one = priority(&my_hash) > priority(&their_hash);
        debug!(
            iteration,
            i_am_the_one,
            their_hash = hex::encode(their_hash),
            "Checked peer commitment list"
        );

        // MATCH
        let evaluations = self.evaluate(&mine, &theirs);
        let my_table: Vec<Vec<bool>> = evaluations
            .iter()
            .map(|row| row.iter().map(|e| e.accepted).collect())
            .collect();

        // RECONCILE
        peer.send(Message::SuccessTable(my_table.clone())).await?;
        let their_table = expect_message!(
            proceed!(peer.receive().await?),
            "SuccessTable",
            Message::SuccessTable(table) => table
        );
        check_table_shape(&their_table, params.parallel_sessions)?;

        let selected = select_pair(&my_table, &their_table, i_am_the_one);
        debug!(iteration, ?selected, "Reconciled success tables");

        let Some(pair) = selected else {
            peer.send(Message::Control(Control::Restart)).await?;
            return match proceed!(peer.receive().await?) {
                Message::Control(Control::Restart) | Message::SessionReveal { .. } => {
                    Ok(Step::Restart)
                }
                other => Err(unexpected("Control(Restart)", &other)),
            };
        };

        let evaluation = &evaluations[pair.their][pair.mine];
        peer.send(Message::SessionReveal {
            z: evaluation.z.to_bytes(),
            r_seed: mine[pair.mine].r_seed,
        })
        .await?;

        let (z_bytes, their_seed) = match proceed!(peer.receive().await?) {
            Message::Control(Control::Restart) => return Ok(Step::Restart),
            Message::SessionReveal { z, r_seed } => (z, r_seed),
            other => return Err(unexpected("SessionReveal", &other)),
        };

        // FINALIZE
        let z_theirs = PolyVec::from_bytes(&z_bytes, params.l, params.n, params.q)
            .map_err(|e| Error::Malformed(format!("peer response: {}", e)))?;

        self.finalize(
            peer,
            &mine[pair.mine],
            &theirs[pair.their],
            evaluation,
            z_theirs,
            their_seed,
            iteration,
        )
        .await
    }

    /// Rejection test on every `(their, mine)` pair, as a table indexed
    /// `[their][mine]`.
    fn evaluate(
        &self,
        mine: &[CommitRoundRecord],
        theirs: &[Commitment],
    ) -> Vec<Vec<PairEvaluation>> {
        let params = self.params;
        let alpha = params.high_bits_alpha();

        theirs
            .iter()
            .map(|their| {
                mine.iter()
                    .map(|record| {
                        let c1 = &record.commitment.c1 + &their.c1;
                        let c2 = &record.commitment.c2 + &their.c2;
                        let c = challenge(params, self.message, &c1, &c2, &self.pk_bytes);

                        let z = &record.y + &self.share.s1.scale_by_poly(&c);
                        let low = (&record.w - &self.share.s2.scale_by_poly(&c)).low_bits(alpha);
                        let accepted = !z.check_norm_bound(params.response_bound())
                            && !low.check_norm_bound(params.low_bits_bound());

                        PairEvaluation {
                            c1,
                            c2,
                            challenge: c,
                            z,
                            accepted,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Check the peer's revealed response against its commitment, then
    /// combine both halves into the signature.
    #[allow(clippy::too_many_arguments)]
    async fn finalize<T: Transport + ?Sized>(
        &self,
        peer: &Peer<'_, T>,
        mine: &CommitRoundRecord,
        their_commitment: &Commitment,
        evaluation: &PairEvaluation,
        z_theirs: PolyVec,
        their_seed: RandomnessSeed,
        iteration: u32,
    ) -> Result<Step<Signature>> {
        let params = self.params;
        let c = &evaluation.challenge;

        let w_high_theirs = rounded_response(params, &self.a, &z_theirs, &self.share.their_t, c);
        let r_theirs = commitment::randomness_from_seed(params, &their_seed);

        let opened = self
            .key
            .open(params, their_commitment, &w_high_theirs, &r_theirs);
        let norm_ok = !z_theirs.check_norm_bound(params.response_bound());
        let reason = if opened {
            AbortReason::ResponseNormExceeded
        } else {
            AbortReason::CommitmentOpeningFailed
        };
        proceed!(peer.confirm(opened && norm_ok, reason).await?);
        debug!(iteration, "Peer response opened its commitment");

        let z = &evaluation.z + &z_theirs;
        let w_high_roof = &mine.w_high + &w_high_theirs;
        let w_high = rounded_response(
            params,
            &self.a,
            &z,
            &scaled_t1(params, &self.public_key.t1),
            c,
        );
        let (h1, h2) = hint::make_hint(&w_high, &w_high_roof, params.hint_alpha());

        Ok(Step::Continue(Signature {
            z,
            r_seed1: mine.r_seed,
            r_seed2: their_seed,
            c1: evaluation.c1.clone(),
            c2: evaluation.c2.clone(),
            h1,
            h2,
            iterations: iteration,
        }))
    }
}

/// Little-endian 64-bit prefix of a commitment-list digest
fn priority(digest: &Digest32) -> u64 {
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(prefix)
}

fn check_table_shape(table: &[Vec<bool>], sessions: usize) -> Result<()> {
    if table.len() != sessions || table.iter().any(|row| row.len() != sessions) {
        return Err(Error::Malformed(format!(
            "success table must be {0}x{0}",
            sessions
        )));
    }
    Ok(())
}

/// Pick the first mutually accepted pair.
///
/// `mine` is indexed `[their][mine]` and `theirs` `[mine][their]`, each
/// from its owner's viewpoint. The party with the higher priority orders by
/// its peer's index first; the other orders by its own, so both land on
/// the same logical pair.
pub(crate) fn select_pair(
    mine: &[Vec<bool>],
    theirs: &[Vec<bool>],
    i_am_the_one: bool,
) -> Option<IndexPair> {
    let sessions = mine.len();
    let accepted = (0..sessions)
        .flat_map(|their| (0..sessions).map(move |mine| IndexPair { their, mine }))
        .filter(|pair| mine[pair.their][pair.mine] && theirs[pair.mine][pair.their]);

    if i_am_the_one {
        accepted.min_by_key(|pair| (pair.their, pair.mine))
    } else {
        accepted.min_by_key(|pair| (pair.mine, pair.their))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transpose(table: &[Vec<bool>]) -> Vec<Vec<bool>> {
        (0..table.len())
            .map(|i| table.iter().map(|row| row[i]).collect())
            .collect()
    }

    #[test]
    fn test_select_pair_agrees_across_viewpoints() {
        // logical acceptance matrix indexed [alice][bob]
        let both = vec![
            vec![false, false, true],
            vec![false, true, false],
            vec![true, false, false],
        ];
        // each party's own table is indexed [their][mine]
        let alice_table = transpose(&both);
        let bob_table = both.clone();

        let from_alice = select_pair(&alice_table, &bob_table, true).unwrap();
        let from_bob = select_pair(&bob_table, &alice_table, false).unwrap();

        assert_eq!(from_alice, IndexPair { their: 0, mine: 2 });
        assert_eq!(from_bob, IndexPair { their: 2, mine: 0 });
    }

    #[test]
    fn test_select_pair_requires_both_sides() {
        let mine = vec![vec![true, true], vec![true, true]];
        let theirs = vec![vec![false, false], vec![false, false]];
        assert_eq!(select_pair(&mine, &theirs, true), None);
        assert_eq!(select_pair(&theirs, &mine, false), None);
    }

    #[test]
    fn test_priority_is_little_endian_prefix() {
        let mut digest = [0u8; 32];
        digest[0] = 2;
        digest[8] = 0xff;
        assert_eq!(priority(&digest), 2);
    }

    #[test]
    fn test_table_shape_is_checked() {
        assert!(check_table_shape(&[vec![true; 2], vec![false; 2]], 2).is_ok());
        assert!(check_table_shape(&[vec![true; 2]], 2).is_err());
        assert!(check_table_shape(&[vec![true; 2], vec![false; 3]], 2).is_err());
    }
}
