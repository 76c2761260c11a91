//! Two-party message transport
//!
//! The protocol runs over one ordered, reliable, authenticated duplex
//! channel. Messages arrive in strict lockstep; a message of the wrong kind
//! for the current phase is a local fault.

use crate::error::{proceed, AbortReason, Step};
use crate::hashes::Digest32;
use crate::ring::sampling::SEED_BYTES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use ::async_trait::async_trait;

/// In-process transport pair for tests and local runs
pub mod memory;

pub use memory::MemoryTransport;

/// Duplex channel to the peer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message to the peer
    async fn send(&self, message: &Message) -> Result<()>;

    /// Wait for the next message from the peer
    async fn receive(&self) -> Result<Message>;
}

/// Control signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Control {
    Ok,
    Abort,
    Restart,
    Error,
}

/// One candidate commitment `(c1, c2)` in canonical bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentPair {
    pub c1: Vec<u8>,
    pub c2: Vec<u8>,
}

/// Every message the two parties exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Message {
    /// `H1` of the keygen seed
    SeedCommit(Digest32),
    SeedReveal([u8; SEED_BYTES]),
    /// `H2` of the party's `t` contribution
    TCommit(Digest32),
    /// Canonical bytes of the party's `t` contribution
    TReveal(Vec<u8>),
    Control(Control),
    /// `H3` of the party's candidate commitments
    CommitListHash(Digest32),
    CommitList(Vec<CommitmentPair>),
    /// Indexed `[theirCandidate][ownCandidate]` from the sender's viewpoint
    SuccessTable(Vec<Vec<bool>>),
    /// Response and randomness seed for the selected candidate pair
    SessionReveal {
        z: Vec<u8>,
        r_seed: [u8; SEED_BYTES],
    },
}

impl Message {
    /// Variant name, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Message::SeedCommit(_) => "SeedCommit",
            Message::SeedReveal(_) => "SeedReveal",
            Message::TCommit(_) => "TCommit",
            Message::TReveal(_) => "TReveal",
            Message::Control(Control::Ok) => "Control(Ok)",
            Message::Control(Control::Abort) => "Control(Abort)",
            Message::Control(Control::Restart) => "Control(Restart)",
            Message::Control(Control::Error) => "Control(Error)",
            Message::CommitListHash(_) => "CommitListHash",
            Message::CommitList(_) => "CommitList",
            Message::SuccessTable(_) => "SuccessTable",
            Message::SessionReveal { .. } => "SessionReveal",
        }
    }
}

/// Encode a message for the wire
pub fn encode_message(message: &Message) -> Result<Vec<u8>> {
    serde_json::to_vec(message).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a message from the wire
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

pub(crate) fn unexpected(expected: &'static str, received: &Message) -> Error {
    Error::UnexpectedMessage {
        expected,
        received: received.kind(),
    }
}

/// Unwrap the expected message variant or return an `UnexpectedMessage`
/// fault from the enclosing function.
macro_rules! expect_message {
    ($message:expr, $expected:literal, $pattern:pat => $value:expr) => {
        match $message {
            $pattern => $value,
            other => return Err($crate::transport::unexpected($expected, &other)),
        }
    };
}

pub(crate) use expect_message;

/// Protocol-level view of the transport.
///
/// Interprets incoming `Abort` and `Error` control messages, which may
/// arrive in place of any other message.
pub(crate) struct Peer<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> Peer<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub async fn send(&self, message: Message) -> Result<()> {
        self.transport.send(&message).await
    }

    pub async fn receive(&self) -> Result<Step<Message>> {
        match self.transport.receive().await? {
            Message::Control(Control::Abort) => {
                warn!("peer aborted the protocol");
                Ok(Step::Abort(AbortReason::PeerAborted))
            }
            Message::Control(Control::Error) => Err(Error::PeerFault),
            message => Ok(Step::Continue(message)),
        }
    }

    /// Tell the peer we abort, then report `reason` locally
    pub async fn abort<X>(&self, reason: AbortReason) -> Result<Step<X>> {
        warn!(%reason, "aborting protocol");
        self.send(Message::Control(Control::Abort)).await?;
        Ok(Step::Abort(reason))
    }

    /// Report the result of a binding check and wait for the peer's own
    /// verdict. Both sides must send `Ok` to continue.
    pub async fn confirm(&self, passed: bool, reason: AbortReason) -> Result<Step<()>> {
        if !passed {
            return self.abort(reason).await;
        }
        self.send(Message::Control(Control::Ok)).await?;

        expect_message!(
            proceed!(self.receive().await?),
            "Control(Ok)",
            Message::Control(Control::Ok) => Ok(Step::Continue(()))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_codec() {
        let messages = vec![
            Message::SeedCommit([1; 32]),
            Message::Control(Control::Restart),
            Message::CommitList(vec![CommitmentPair {
                c1: vec![1, 2],
                c2: vec![3],
            }]),
            Message::SuccessTable(vec![vec![true, false], vec![false, false]]),
            Message::SessionReveal {
                z: vec![9; 8],
                r_seed: [7; 32],
            },
        ];

        for message in messages {
            let bytes = encode_message(&message).unwrap();
            assert_eq!(decode_message(&bytes).unwrap(), message);
        }
    }

    #[test]
    fn test_control_wire_names() {
        let bytes = encode_message(&Message::Control(Control::Abort)).unwrap();
        let json = String::from_utf8(bytes).unwrap();
        assert_eq!(json, r#"{"type":"Control","payload":"ABORT"}"#);
    }

    #[test]
    fn test_garbage_is_a_deserialization_fault() {
        assert!(matches!(
            decode_message(b"{\"type\":\"Nope\"}"),
            Err(Error::Deserialization(_))
        ));
    }
}
