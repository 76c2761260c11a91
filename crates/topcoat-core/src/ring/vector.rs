use super::{Poly, COEFF_BYTES};
use crate::{Error, Result};
use std::ops::{Add, Sub};
use zeroize::Zeroize;

/// Column vector of ring elements.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct PolyVec(Vec<Poly>);

impl PolyVec {
    pub fn zero(len: usize, n: usize, q: i64) -> Self {
        Self(vec![Poly::zero(n, q); len])
    }

    pub fn from_polys(polys: Vec<Poly>) -> Self {
        Self(polys)
    }

    pub fn polys(&self) -> &[Poly] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Poly> {
        self.0.iter()
    }

    /// True when the vector has exactly `len` entries of dimension `n` mod `q`
    pub fn has_shape(&self, len: usize, n: usize, q: i64) -> bool {
        self.len() == len && self.0.iter().all(|p| p.len() == n && p.modulus() == q)
    }

    fn map(&self, f: impl Fn(&Poly) -> Poly) -> Self {
        Self(self.0.iter().map(f).collect())
    }

    pub fn scale(&self, factor: i64) -> Self {
        self.map(|p| p.scale(factor))
    }

    /// Multiply every entry by `c`
    pub fn scale_by_poly(&self, c: &Poly) -> Self {
        self.map(|p| c * p)
    }

    pub fn power2round(&self, d: u32) -> (PolyVec, PolyVec) {
        let (high, low) = self.0.iter().map(|p| p.power2round(d)).unzip();
        (Self(high), Self(low))
    }

    pub fn high_bits(&self, alpha: i64) -> Self {
        self.map(|p| p.high_bits(alpha))
    }

    pub fn low_bits(&self, alpha: i64) -> Self {
        self.map(|p| p.low_bits(alpha))
    }

    /// Returns `true` when any coefficient reaches `bound` in absolute value
    pub fn check_norm_bound(&self, bound: i64) -> bool {
        self.0.iter().any(|p| p.check_norm_bound(bound))
    }

    pub fn infinity_norm(&self) -> i64 {
        self.0.iter().map(Poly::infinity_norm).max().unwrap_or(0)
    }

    /// Euclidean norm of the centered coefficients
    pub fn second_norm(&self) -> f64 {
        let squares: u128 = self.0.iter().map(Poly::square_norm).sum();
        (squares as f64).sqrt()
    }

    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        for p in &self.0 {
            p.write_bytes(out);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_bytes(&mut out);
        out
    }

    /// Number of bytes [`PolyVec::to_bytes`] produces for this shape
    pub fn encoded_len(len: usize, n: usize) -> usize {
        len * n * COEFF_BYTES
    }

    /// Decode exactly `len` polynomials of dimension `n`.
    pub fn from_bytes(bytes: &[u8], len: usize, n: usize, q: i64) -> Result<Self> {
        if bytes.len() != Self::encoded_len(len, n) {
            return Err(Error::Deserialization(format!(
                "vector of {} polynomials needs {} bytes, got {}",
                len,
                Self::encoded_len(len, n),
                bytes.len()
            )));
        }
        if n == 0 {
            return Ok(Self::zero(len, 0, q));
        }

        bytes
            .chunks_exact(n * COEFF_BYTES)
            .map(|chunk| Poly::from_bytes(chunk, n, q))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl Add for &PolyVec {
    type Output = PolyVec;

    fn add(self, rhs: &PolyVec) -> PolyVec {
        debug_assert_eq!(self.len(), rhs.len(), "vector lengths differ");
        PolyVec(self.0.iter().zip(&rhs.0).map(|(a, b)| a + b).collect())
    }
}

impl Sub for &PolyVec {
    type Output = PolyVec;

    fn sub(self, rhs: &PolyVec) -> PolyVec {
        debug_assert_eq!(self.len(), rhs.len(), "vector lengths differ");
        PolyVec(self.0.iter().zip(&rhs.0).map(|(a, b)| a - b).collect())
    }
}

/// Row-major matrix of ring elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyMatrix {
    rows: Vec<PolyVec>,
}

impl PolyMatrix {
    pub fn from_rows(rows: Vec<PolyVec>) -> Self {
        debug_assert!(
            rows.windows(2).all(|w| w[0].len() == w[1].len()),
            "ragged matrix"
        );
        Self { rows }
    }

    pub fn zero(rows: usize, cols: usize, n: usize, q: i64) -> Self {
        Self::from_rows(vec![PolyVec::zero(cols, n, q); rows])
    }

    pub fn identity(size: usize, n: usize, q: i64) -> Self {
        let rows = (0..size)
            .map(|i| {
                let mut row = vec![Poly::zero(n, q); size];
                row[i] = Poly::constant(1, n, q);
                PolyVec::from_polys(row)
            })
            .collect();
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> &[PolyVec] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map(PolyVec::len).unwrap_or(0)
    }

    /// Place `other` to the right of `self`
    pub fn concat(&self, other: &PolyMatrix) -> Self {
        debug_assert_eq!(self.row_count(), other.row_count(), "row counts differ");
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(left, right)| {
                let mut polys = left.polys().to_vec();
                polys.extend_from_slice(right.polys());
                PolyVec::from_polys(polys)
            })
            .collect();
        Self::from_rows(rows)
    }

    /// Matrix-vector product `self · v`
    pub fn mul_vec(&self, v: &PolyVec) -> PolyVec {
        debug_assert_eq!(self.col_count(), v.len(), "dimension mismatch");
        let (n, q) = match v.polys().first() {
            Some(p) => (p.len(), p.modulus()),
            None => return PolyVec::from_polys(Vec::new()),
        };
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(v.iter())
                    .fold(Poly::zero(n, q), |acc, (a, b)| &acc + &(a * b))
            })
            .collect();
        PolyVec::from_polys(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: i64 = 257;

    fn vec_of(rows: &[[i64; 4]]) -> PolyVec {
        PolyVec::from_polys(rows.iter().map(|r| Poly::from_coeffs(*r, Q)).collect())
    }

    #[test]
    fn test_identity_is_neutral() {
        let v = vec_of(&[[1, 2, 3, 4], [250, 0, 7, 9], [5, 5, 5, 5]]);
        let id = PolyMatrix::identity(3, 4, Q);
        assert_eq!(id.mul_vec(&v), v);
    }

    #[test]
    fn test_block_concat_selects_columns() {
        // [0 | I] · (a, b) = b
        let m = PolyMatrix::zero(2, 1, 4, Q).concat(&PolyMatrix::identity(2, 4, Q));
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.col_count(), 3);

        let v = vec_of(&[[9, 9, 9, 9], [1, 0, 0, 0], [0, 1, 0, 0]]);
        let expected = vec_of(&[[1, 0, 0, 0], [0, 1, 0, 0]]);
        assert_eq!(m.mul_vec(&v), expected);
    }

    #[test]
    fn test_second_norm() {
        let v = vec_of(&[[3, 0, 0, 0], [0, -4, 0, 0]]);
        assert!((v.second_norm() - 5.0).abs() < 1e-9);
        assert_eq!(v.infinity_norm(), 4);
        assert!(v.check_norm_bound(4));
        assert!(!v.check_norm_bound(5));
    }

    #[test]
    fn test_bytes_roundtrip_and_shape() {
        let v = vec_of(&[[1, 2, 3, 4], [5, 6, 7, 256]]);
        let bytes = v.to_bytes();
        assert_eq!(bytes.len(), PolyVec::encoded_len(2, 4));
        assert_eq!(PolyVec::from_bytes(&bytes, 2, 4, Q).unwrap(), v);
        assert!(PolyVec::from_bytes(&bytes, 3, 4, Q).is_err());
        assert!(v.has_shape(2, 4, Q));
        assert!(!v.has_shape(2, 8, Q));
    }
}
