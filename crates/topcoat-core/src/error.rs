//! Error and outcome types for Topcoat operations
//!
//! Three kinds of results flow out of a protocol run:
//! - local faults, carried by [`Error`] in the `Err` arm,
//! - protocol aborts, carried by [`Outcome::Aborted`],
//! - restarts, which stay inside the signing loop as [`Step::Restart`].

use thiserror::Error;

/// Result type alias for Topcoat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Local faults. None of these are retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Parameter set failed validation
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The peer sent a message of the wrong kind for the current phase
    #[error("Unexpected message: expected {expected}, received {received}")]
    UnexpectedMessage {
        expected: &'static str,
        received: &'static str,
    },

    /// A payload decoded but had the wrong shape
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The randomness source failed
    #[error("Randomness source failed: {0}")]
    Randomness(String),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout waiting for message
    #[error("Timeout waiting for {0}")]
    Timeout(String),

    /// The peer reported a local fault of its own
    #[error("Peer reported a fault")]
    PeerFault,
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::Randomness(e.to_string())
    }
}

/// Why a protocol run was aborted.
///
/// Every variant except [`AbortReason::PeerAborted`] is a binding check that
/// failed on a value supplied by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("revealed seed does not match its commitment")]
    SeedHashMismatch,

    #[error("revealed t does not match its commitment")]
    THashMismatch,

    #[error("commitment list does not match its hash")]
    CommitListHashMismatch,

    #[error("peer commitment failed to open")]
    CommitmentOpeningFailed,

    #[error("peer response exceeds the norm bound")]
    ResponseNormExceeded,

    #[error("peer aborted the protocol")]
    PeerAborted,
}

/// Final outcome of a protocol run that did not fault.
#[must_use]
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Aborted(AbortReason),
}

impl<T> Outcome<T> {
    /// Returns the completed value, if any
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Aborted(_) => None,
        }
    }

    /// Returns the abort reason, if any
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Aborted(reason) => Some(*reason),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Aborted(reason) => Outcome::Aborted(reason),
        }
    }
}

/// Result of one protocol phase.
#[must_use]
#[derive(Debug)]
pub(crate) enum Step<T> {
    Continue(T),
    Restart,
    Abort(AbortReason),
}

/// Unwraps a `Step::Continue`, returning early from the enclosing function
/// (which must return `Result<Step<_>>`) on restart or abort.
macro_rules! proceed {
    ($step:expr) => {
        match $step {
            $crate::error::Step::Continue(value) => value,
            $crate::error::Step::Restart => return Ok($crate::error::Step::Restart),
            $crate::error::Step::Abort(reason) => {
                return Ok($crate::error::Step::Abort(reason))
            }
        }
    };
}

pub(crate) use proceed;
