//! Integer lattice basis reduction (LLL).
//!
//! The basis vectors are the rows of an integer [`DMatrix`]. Gram-Schmidt
//! data is kept in exact rationals, so the reduced basis is deterministic and
//! independent of any floating-point precision.

use nalgebra::DMatrix;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use tracing::trace;

use crate::error::{Result, SnapError};

/// The classic Lovász parameter.
pub fn default_delta() -> BigRational {
    BigRational::new(BigInt::from(3), BigInt::from(4))
}

/// Exact Gram-Schmidt orthogonalization of the rows of a basis.
struct GramSchmidt {
    /// `mu[(i, j)] = <b_i, b*_j> / <b*_j, b*_j>` for `j < i`.
    mu: DMatrix<BigRational>,
    /// `<b*_i, b*_i>`.
    norms: Vec<BigRational>,
}

impl GramSchmidt {
    fn compute(basis: &DMatrix<BigInt>) -> Result<Self> {
        let (n, m) = basis.shape();
        let mut mu = DMatrix::from_element(n, n, BigRational::zero());
        let mut stars: Vec<Vec<BigRational>> = Vec::with_capacity(n);
        let mut norms = Vec::with_capacity(n);

        for i in 0..n {
            let row: Vec<BigRational> = (0..m)
                .map(|c| BigRational::from_integer(basis[(i, c)].clone()))
                .collect();
            let mut star = row.clone();
            for j in 0..i {
                let dot: BigRational = row.iter().zip(&stars[j]).map(|(a, b)| a * b).sum();
                let coeff = dot / &norms[j];
                for (s, b) in star.iter_mut().zip(&stars[j]) {
                    *s -= &coeff * b;
                }
                mu[(i, j)] = coeff;
            }
            let norm: BigRational = star.iter().map(|s| s * s).sum();
            if norm.is_zero() {
                return Err(SnapError::ReductionFailed(format!(
                    "basis row {i} is linearly dependent on the previous rows"
                )));
            }
            mu[(i, i)] = BigRational::one();
            stars.push(star);
            norms.push(norm);
        }

        Ok(Self { mu, norms })
    }

    /// Update after rows `k - 1` and `k` of the basis were swapped.
    ///
    /// Only rows and columns `k - 1` and `k` of `mu` change, plus the two
    /// matching norms.
    fn swap(&mut self, k: usize) {
        let n = self.norms.len();
        let mu = self.mu[(k, k - 1)].clone();
        let combined = &self.norms[k] + &mu * &mu * &self.norms[k - 1];

        let new_mu = &mu * &self.norms[k - 1] / &combined;
        self.norms[k] = &self.norms[k - 1] * &self.norms[k] / &combined;
        self.norms[k - 1] = combined;
        self.mu[(k, k - 1)] = new_mu.clone();

        for j in 0..k - 1 {
            self.mu.swap((k - 1, j), (k, j));
        }
        for i in k + 1..n {
            let t = self.mu[(i, k)].clone();
            let upper = &self.mu[(i, k - 1)] - &mu * &t;
            self.mu[(i, k - 1)] = t + &new_mu * &upper;
            self.mu[(i, k)] = upper;
        }
    }
}

/// Reduce the rows of `basis` in place with Lovász parameter `delta`
/// (`1/4 < delta < 1`).
///
/// Gram-Schmidt data is computed once for the input basis and then updated
/// in place by size reductions and swaps. Fails if the rows are linearly
/// dependent.
pub fn lll_reduce(basis: &mut DMatrix<BigInt>, delta: &BigRational) -> Result<()> {
    let n = basis.nrows();
    if n < 2 {
        return Ok(());
    }
    let cols = basis.ncols();
    let mut gs = GramSchmidt::compute(basis)?;
    let mut k = 1;
    let mut swaps = 0usize;

    while k < n {
        // Size reduction of row k against every earlier row.
        for j in (0..k).rev() {
            let q = gs.mu[(k, j)].round().to_integer();
            if q.is_zero() {
                continue;
            }
            for c in 0..cols {
                let t = &q * &basis[(j, c)];
                basis[(k, c)] -= t;
            }
            let qr = BigRational::from_integer(q);
            for i in 0..j {
                let t = &gs.mu[(j, i)] * &qr;
                gs.mu[(k, i)] -= t;
            }
            gs.mu[(k, j)] -= qr;
        }

        let mu = &gs.mu[(k, k - 1)];
        let bound = (delta - mu * mu) * &gs.norms[k - 1];
        if gs.norms[k] >= bound {
            k += 1;
        } else {
            basis.swap_rows(k, k - 1);
            gs.swap(k);
            swaps += 1;
            k = (k - 1).max(1);
        }
    }

    trace!(rows = n, swaps, "lll reduction finished");
    Ok(())
}
