//! # Topcoat Core
//!
//! Two-party threshold signatures over module lattices.
//!
//! This crate provides:
//! - Distributed key generation between two mutually distrusting parties
//! - Interactive signing with parallel candidate sessions and rejection
//!   sampling
//! - Non-interactive verification under the combined public key
//!
//! ## Protocol Overview
//!
//! Both parties hold a share `(s1, s2)` of the secret. Signing follows
//! Fiat-Shamir with aborts: each party commits to several masked
//! candidates, both test every cross pairing against the norm bounds, and
//! the first pairing both accept is opened and combined. The resulting
//! signature verifies like a single-signer lattice signature.
//!
//! ## Example
//!
//! ```rust,ignore
//! use topcoat_core::{keygen, sign, verify, MemoryTransport, ParameterSet};
//!
//! let params = ParameterSet::recommended();
//! let (alice, bob) = MemoryTransport::pair();
//!
//! // Each side runs against its own endpoint
//! let key_pair = keygen::run_keygen(&params, &alice, "alice").await?;
//!
//! // Sign a message once both sides hold their shares
//! let signature = sign::run_sign(&params, &alice, &pk, &share, message, "alice").await?;
//! assert!(verify::verify(&params, message, &signature, &pk));
//! ```

pub mod commitment;
pub mod error;
pub mod hashes;
pub mod hint;
pub mod keygen;
pub mod params;
pub mod ring;
pub mod sign;
pub mod transport;
pub mod types;
pub mod verify;

pub use error::{AbortReason, Error, Outcome, Result};
pub use params::ParameterSet;
pub use transport::{Message, MemoryTransport, Transport};
pub use types::{KeyPair, PrivateKeyShare, PublicKey, Signature};
pub use verify::{verify, verify_bytes};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
