//! Public parameter sets
//!
//! Both parties must agree on one [`ParameterSet`] out of band before any
//! message is exchanged. The set is passed explicitly to every entry point.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable scheme parameters shared by both parties.
///
/// Field names serialize in the `SCREAMING_SNAKE_CASE` form used by
/// parameter files, e.g. `GAMMA_PRIME` or `COMMITMENT_Nlower`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct ParameterSet {
    /// Candidate commitments generated per party per iteration
    pub parallel_sessions: usize,
    /// Ring dimension
    pub n: usize,
    /// Ring modulus
    pub q: i64,
    /// Bits dropped from `t` by Power2Round
    pub d: u32,
    /// Rows of `A`
    pub k: usize,
    /// Columns of `A`
    pub l: usize,
    /// Infinity-norm bound of the secret vectors
    pub eta: i64,
    /// Number of nonzero challenge coefficients
    pub tau: usize,
    /// Bound on `c·s` coefficients
    pub beta: i64,
    /// Mask range
    pub gamma: i64,
    /// Rounding radius
    pub gamma_prime: i64,

    pub commitment_q: i64,
    pub commitment_n: usize,
    /// Length of the commitment randomness vector
    pub commitment_k: usize,
    /// Length of the committed message (must equal `k`)
    pub commitment_l: usize,
    /// Rows of `A1`
    #[serde(rename = "COMMITMENT_Nlower")]
    pub commitment_n_lower: usize,
    /// Infinity-norm bound of the commitment randomness
    pub commitment_beta: i64,
    /// Second-norm bound enforced when opening
    #[serde(rename = "COMMITMENT_B2")]
    pub commitment_b2: i64,
}

impl ParameterSet {
    /// Parameters modelled on NIST level-2 Dilithium.
    pub fn recommended() -> Self {
        Self {
            parallel_sessions: 5,
            n: 256,
            q: 8_380_417,
            d: 13,
            k: 4,
            l: 4,
            eta: 2,
            tau: 39,
            beta: 78,
            gamma: 1 << 17,
            gamma_prime: 95_232,
            commitment_q: 8_380_417,
            commitment_n: 256,
            commitment_k: 15,
            commitment_l: 4,
            commitment_n_lower: 5,
            commitment_beta: 256,
            commitment_b2: 16_384,
        }
    }

    /// Tiny parameters for fast tests. Offers no security.
    pub fn toy() -> Self {
        Self {
            parallel_sessions: 4,
            n: 8,
            q: 257,
            d: 3,
            k: 2,
            l: 2,
            eta: 1,
            tau: 2,
            beta: 2,
            gamma: 60,
            gamma_prime: 64,
            commitment_q: 257,
            commitment_n: 8,
            commitment_k: 6,
            commitment_l: 2,
            commitment_n_lower: 2,
            commitment_beta: 1,
            commitment_b2: 14,
        }
    }

    /// Parse and validate a JSON parameter file body
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate a JSON parameter file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidParameters(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Check the internal consistency of the set.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::InvalidParameters(msg.to_string()));

        if self.parallel_sessions == 0 {
            return fail("PARALLEL_SESSIONS must be at least 1");
        }
        if self.n == 0 || self.k == 0 || self.l == 0 {
            return fail("N, K and L must be nonzero");
        }
        if self.q < 3 || self.q >= 1 << 31 {
            return fail("Q must lie in [3, 2^31)");
        }
        if self.d == 0 || self.d >= 31 {
            return fail("D must lie in [1, 31)");
        }
        if self.tau == 0 || self.tau > self.n {
            return fail("TAU must lie in [1, N]");
        }
        if self.eta <= 0 || self.beta <= 0 {
            return fail("ETA and BETA must be positive");
        }
        if self.gamma <= self.beta || self.gamma_prime <= self.beta {
            return fail("GAMMA and GAMMA_PRIME must exceed BETA");
        }
        if (self.q - 1) % (2 * self.gamma_prime) != 0 {
            return fail("2*GAMMA_PRIME must divide Q-1");
        }
        if self.commitment_q != self.q || self.commitment_n != self.n {
            return fail("commitment ring must equal the main ring");
        }
        if self.commitment_l != self.k {
            return fail("COMMITMENT_L must equal K");
        }
        if self.commitment_n_lower == 0
            || self.commitment_k <= self.commitment_n_lower + self.commitment_l
        {
            return fail("COMMITMENT_K must exceed COMMITMENT_Nlower + COMMITMENT_L");
        }
        if self.commitment_beta <= 0 || self.commitment_beta >= self.gamma {
            return fail("COMMITMENT_BETA must lie in [1, GAMMA)");
        }
        if self.commitment_b2 <= 0 {
            return fail("COMMITMENT_B2 must be positive");
        }

        Ok(())
    }

    /// Decomposition radius passed to HighBits/LowBits
    pub fn high_bits_alpha(&self) -> i64 {
        2 * self.gamma_prime
    }

    /// Divisor used by the hint codec
    pub fn hint_alpha(&self) -> i64 {
        crate::ring::floor_division(self.q - 1, 2 * self.gamma_prime)
    }

    /// Norm bound a single party's response must stay under
    pub fn response_bound(&self) -> i64 {
        self.gamma - self.beta
    }

    /// Norm bound on `LowBits(w - c·s2)`
    pub fn low_bits_bound(&self) -> i64 {
        self.gamma_prime - self.beta
    }

    /// Norm bound on the combined response at verification time
    pub fn verification_bound(&self) -> i64 {
        2 * (self.gamma - self.commitment_beta)
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::recommended()
    }
}
