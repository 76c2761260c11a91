use super::{centered_modulo, decompose, COEFF_BYTES};
use crate::{Error, Result};
use std::ops::{Add, Mul, Sub};
use zeroize::Zeroize;

/// Polynomial in `Z_q[X]/(X^N + 1)` with canonical coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct Poly {
    coeffs: Vec<i64>,
    #[zeroize(skip)]
    q: i64,
}

impl Poly {
    /// The zero polynomial of dimension `n`
    pub fn zero(n: usize, q: i64) -> Self {
        Self {
            coeffs: vec![0; n],
            q,
        }
    }

    /// Build from arbitrary integers, reducing each into `[0, q)`
    pub fn from_coeffs(coeffs: impl IntoIterator<Item = i64>, q: i64) -> Self {
        Self {
            coeffs: coeffs.into_iter().map(|c| c.rem_euclid(q)).collect(),
            q,
        }
    }

    /// The constant polynomial `value`
    pub fn constant(value: i64, n: usize, q: i64) -> Self {
        let mut poly = Self::zero(n, q);
        if n > 0 {
            poly.coeffs[0] = value.rem_euclid(q);
        }
        poly
    }

    /// Canonical coefficients in `[0, q)`
    pub fn coeffs(&self) -> &[i64] {
        &self.coeffs
    }

    pub fn modulus(&self) -> i64 {
        self.q
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Coefficients lifted to `(-q/2, q/2]`
    pub fn centered(&self) -> impl Iterator<Item = i64> + '_ {
        self.coeffs.iter().map(move |&c| centered_modulo(c, self.q))
    }

    fn map(&self, f: impl Fn(i64) -> i64) -> Self {
        Self::from_coeffs(self.coeffs.iter().map(|&c| f(c)), self.q)
    }

    fn zip_with(&self, other: &Poly, f: impl Fn(i64, i64) -> i64) -> Self {
        debug_assert_eq!(self.q, other.q, "moduli differ");
        debug_assert_eq!(self.len(), other.len(), "dimensions differ");
        Self::from_coeffs(
            self.coeffs
                .iter()
                .zip(&other.coeffs)
                .map(|(&a, &b)| f(a, b)),
            self.q,
        )
    }

    /// Multiply every coefficient by an integer
    pub fn scale(&self, factor: i64) -> Self {
        let factor = factor.rem_euclid(self.q);
        self.map(|c| c * factor)
    }

    /// Split into `(t1, t0)` with `t = t1·2^d + t0` and `t0` centered modulo `2^d`.
    pub fn power2round(&self, d: u32) -> (Poly, Poly) {
        let base = 1i64 << d;
        let mut high = Vec::with_capacity(self.len());
        let mut low = Vec::with_capacity(self.len());
        for &c in &self.coeffs {
            let r0 = centered_modulo(c, base);
            high.push((c - r0) >> d);
            low.push(r0);
        }
        (
            Self::from_coeffs(high, self.q),
            Self::from_coeffs(low, self.q),
        )
    }

    pub fn high_bits(&self, alpha: i64) -> Self {
        self.map(|c| decompose(c, alpha, self.q).0)
    }

    pub fn low_bits(&self, alpha: i64) -> Self {
        self.map(|c| decompose(c, alpha, self.q).1)
    }

    /// Returns `true` when some centered coefficient has absolute value of
    /// at least `bound`.
    pub fn check_norm_bound(&self, bound: i64) -> bool {
        self.centered().any(|c| c.abs() >= bound)
    }

    /// Largest centered absolute coefficient
    pub fn infinity_norm(&self) -> i64 {
        self.centered().map(i64::abs).max().unwrap_or(0)
    }

    /// Sum of squared centered coefficients
    pub fn square_norm(&self) -> u128 {
        self.centered().map(|c| (c * c) as u128).sum()
    }

    /// Append the canonical encoding to `out`
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        for &c in &self.coeffs {
            out.extend_from_slice(&(c as u32).to_le_bytes());
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * COEFF_BYTES);
        self.write_bytes(&mut out);
        out
    }

    /// Decode exactly `n` coefficients, rejecting values outside `[0, q)`.
    pub fn from_bytes(bytes: &[u8], n: usize, q: i64) -> Result<Self> {
        if bytes.len() != n * COEFF_BYTES {
            return Err(Error::Deserialization(format!(
                "polynomial needs {} bytes, got {}",
                n * COEFF_BYTES,
                bytes.len()
            )));
        }

        let coeffs = bytes
            .chunks_exact(COEFF_BYTES)
            .map(|chunk| {
                let mut word = [0u8; COEFF_BYTES];
                word.copy_from_slice(chunk);
                let c = u32::from_le_bytes(word) as i64;
                if c >= q {
                    Err(Error::Deserialization(format!(
                        "coefficient {} out of range for modulus {}",
                        c, q
                    )))
                } else {
                    Ok(c)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { coeffs, q })
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        self.zip_with(rhs, |a, b| a - b)
    }
}

/// Negacyclic schoolbook product. Zero coefficients of the left operand are
/// skipped, so put sparse challenges on the left.
impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        debug_assert_eq!(self.q, rhs.q, "moduli differ");
        debug_assert_eq!(self.len(), rhs.len(), "dimensions differ");

        let n = self.len();
        let q = self.q;
        let mut acc = vec![0i64; n];

        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                let k = i + j;
                if k < n {
                    acc[k] = (acc[k] + a * b) % q;
                } else {
                    acc[k - n] = (acc[k - n] - a * b) % q;
                }
            }
        }

        Poly::from_coeffs(acc, q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: i64 = 257;

    #[test]
    fn test_from_coeffs_reduces() {
        let p = Poly::from_coeffs([-1, 257, 300, 5], Q);
        assert_eq!(p.coeffs(), &[256, 0, 43, 5]);
        assert_eq!(p.centered().collect::<Vec<_>>(), vec![-1, 0, 43, 5]);
    }

    #[test]
    fn test_negacyclic_wraparound() {
        // X^3 * X = X^4 = -1 in Z_q[X]/(X^4 + 1)
        let x3 = Poly::from_coeffs([0, 0, 0, 1], Q);
        let x = Poly::from_coeffs([0, 1, 0, 0], Q);
        let product = &x3 * &x;
        assert_eq!(product.coeffs(), &[Q - 1, 0, 0, 0]);
    }

    #[test]
    fn test_mul_matches_commutative() {
        let a = Poly::from_coeffs([3, -7, 0, 12, 100, -50, 1, 9], Q);
        let b = Poly::from_coeffs([-1, 0, 4, 4, 250, 8, -3, 2], Q);
        assert_eq!(&a * &b, &b * &a);

        let one = Poly::constant(1, 8, Q);
        assert_eq!(&a * &one, a);
    }

    #[test]
    fn test_add_sub_inverse() {
        let a = Poly::from_coeffs([10, 200, 256, 0], Q);
        let b = Poly::from_coeffs([100, 100, 2, 1], Q);
        assert_eq!(&(&a + &b) - &b, a);
    }

    #[test]
    fn test_power2round_reassembles() {
        let t = Poly::from_coeffs(0..Q, Q);
        let (t1, t0) = t.power2round(3);
        let rebuilt = &t1.scale(8) + &t0;
        assert_eq!(rebuilt, t);
        assert!(!t0.check_norm_bound(5));
    }

    #[test]
    fn test_high_low_bits_reassemble() {
        let r = Poly::from_coeffs(0..Q, Q);
        let high = r.high_bits(64);
        let low = r.low_bits(64);
        assert_eq!(&high.scale(64) + &low, r);
        assert!(high.coeffs().iter().all(|&c| c < 4));
    }

    #[test]
    fn test_check_norm_bound_uses_centered_values() {
        let p = Poly::from_coeffs([0, 3, -4, 2], Q);
        assert!(p.check_norm_bound(4));
        assert!(!p.check_norm_bound(5));
        assert_eq!(p.infinity_norm(), 4);
        assert_eq!(p.square_norm(), 29);
    }

    #[test]
    fn test_bytes_reject_out_of_range() {
        let p = Poly::from_coeffs([1, 2, 256, 0], Q);
        let bytes = p.to_bytes();
        assert_eq!(Poly::from_bytes(&bytes, 4, Q).unwrap(), p);

        let mut bad = bytes.clone();
        bad[0..4].copy_from_slice(&257u32.to_le_bytes());
        assert!(Poly::from_bytes(&bad, 4, Q).is_err());
        assert!(Poly::from_bytes(&bytes[..15], 4, Q).is_err());
    }
}
