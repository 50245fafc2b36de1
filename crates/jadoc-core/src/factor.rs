//! Compact low-rank factor construction from the input batch.
//!
//! Each input matrix C_i is replaced once, up front, by a factor A_i with
//! `A_i A_i^H ≈ C_i`, built from its (possibly truncated) Hermitian
//! eigendecomposition. The factors, together with a per-matrix
//! regularization term, are the only representation of the inputs the
//! optimizer ever touches: every later iteration rotates the factors in
//! place instead of re-decomposing the inputs.

use crate::error::{JadocError, Result};
use crate::types::{DMatrix, RealScalar, Scalar};
use nalgebra::SymmetricEigen;
use num_traits::{Float, One, Zero};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Regularization style applied to the diagonal energies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Regularization<R: RealScalar> {
    /// One scalar shared across the batch, derived from the average
    /// spectral mass discarded by rank truncation plus a unit offset that
    /// keeps the objective well defined at full rank.
    FixedScalar,

    /// Per-matrix shrinkage toward a scalar multiple of the identity:
    /// the term is `alpha * mean(|kept eigenvalues|)` and the factors are
    /// scaled by `sqrt(1 - alpha)`.
    Shrinkage {
        /// Shrinkage strength in `[0, 1]`
        alpha: R,
    },
}

impl<R: RealScalar> Default for Regularization<R> {
    fn default() -> Self {
        Self::Shrinkage {
            alpha: <R as RealScalar>::from_f64(0.9),
        }
    }
}

/// How eigenvalues of the input matrices are mapped before taking square
/// roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpectrumMode {
    /// Take absolute values; admits general (indefinite) Hermitian input.
    #[default]
    AbsoluteValue,

    /// Clip negative eigenvalues to zero; for inputs that are PSD by
    /// convention up to numerical noise.
    ClipNegative,
}

/// The compact sufficient-statistic representation of the input batch.
///
/// Owns the K rotated factors (N×S each) and the immutable per-matrix
/// regularization terms. The diagonalization loop holds exclusive ownership
/// of a `FactorSet` for its whole lifetime and rotates it once per accepted
/// step.
#[derive(Debug, Clone)]
pub struct FactorSet<T: Scalar> {
    factors: Vec<DMatrix<T>>,
    regularization: Vec<T::Real>,
    dimension: usize,
    rank: usize,
}

impl<T: Scalar> FactorSet<T> {
    /// Builds factors and regularization terms from a batch of
    /// symmetric/Hermitian matrices.
    ///
    /// # Arguments
    /// * `matrices` - K square matrices of identical size N×N
    /// * `rank` - target factor rank S, `1 <= S <= N`
    /// * `spectrum` - negative-eigenvalue handling
    /// * `regularization` - regularization style
    /// * `seed` - optional N×N transform pre-applied to every factor
    ///
    /// # Errors
    ///
    /// Fails with `InvalidConfiguration` for an empty batch, an out-of-range
    /// rank or shrinkage strength, or a misshapen seed, and with
    /// `InvalidInput` when a matrix is not square, does not match the batch
    /// dimension, or is not symmetric/Hermitian within tolerance.
    pub fn build(
        matrices: &[DMatrix<T>],
        rank: usize,
        spectrum: SpectrumMode,
        regularization: Regularization<T::Real>,
        seed: Option<&DMatrix<T>>,
    ) -> Result<Self> {
        if matrices.is_empty() {
            return Err(JadocError::invalid_configuration(
                "at least one input matrix is required",
                "matrices",
                "[]",
            ));
        }
        let n = matrices[0].nrows();
        for (i, c) in matrices.iter().enumerate() {
            if c.nrows() != c.ncols() {
                return Err(JadocError::invalid_input(format!(
                    "matrix {} is not square: {}x{}",
                    i,
                    c.nrows(),
                    c.ncols()
                )));
            }
            if c.nrows() != n {
                return Err(JadocError::invalid_input(format!(
                    "matrix {} is {}x{}, expected {}x{}",
                    i,
                    c.nrows(),
                    c.ncols(),
                    n,
                    n
                )));
            }
        }
        if rank == 0 || rank > n {
            return Err(JadocError::invalid_configuration(
                format!("rank must be in 1..={}", n),
                "rank",
                rank,
            ));
        }
        if let Some(b0) = seed {
            if b0.nrows() != n || b0.ncols() != n {
                return Err(JadocError::invalid_configuration(
                    format!("seed transform must be {}x{}", n, n),
                    "seed",
                    format!("({}, {})", b0.nrows(), b0.ncols()),
                ));
            }
        }
        let factor_scale = match regularization {
            Regularization::FixedScalar => T::Real::one(),
            Regularization::Shrinkage { alpha } => {
                if alpha < T::Real::zero() || alpha > T::Real::one() {
                    return Err(JadocError::invalid_configuration(
                        "shrinkage strength must lie in [0, 1]",
                        "alpha",
                        alpha,
                    ));
                }
                <T::Real as Float>::sqrt(T::Real::one() - alpha)
            }
        };

        let k = matrices.len();
        let n_real = <T::Real as RealScalar>::from_usize(n);
        let mut factors = Vec::with_capacity(k);
        let mut regularization_terms = Vec::with_capacity(k);
        let mut discarded_mass = T::Real::zero();

        for (i, c) in matrices.iter().enumerate() {
            check_hermitian(c, i)?;

            let eig = SymmetricEigen::new(c.clone());
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| {
                <T::Real as Float>::abs(eig.eigenvalues[b])
                    .partial_cmp(&<T::Real as Float>::abs(eig.eigenvalues[a]))
                    .unwrap_or(Ordering::Equal)
            });

            let mut kept_sum = T::Real::zero();
            let mut a = DMatrix::<T>::zeros(n, rank);
            for (col, &idx) in order.iter().take(rank).enumerate() {
                let value = match spectrum {
                    SpectrumMode::AbsoluteValue => <T::Real as Float>::abs(eig.eigenvalues[idx]),
                    SpectrumMode::ClipNegative => {
                        <T::Real as Float>::max(eig.eigenvalues[idx], T::Real::zero())
                    }
                };
                kept_sum += value;
                let weight = T::from_real(<T::Real as Float>::sqrt(value) * factor_scale);
                for row in 0..n {
                    a[(row, col)] = eig.eigenvectors[(row, idx)] * weight;
                }
            }

            match regularization {
                Regularization::FixedScalar => {
                    discarded_mass += (c.trace().real() - kept_sum) / n_real;
                }
                Regularization::Shrinkage { alpha } => {
                    regularization_terms.push(alpha * kept_sum / n_real);
                }
            }

            if let Some(b0) = seed {
                a = b0 * a;
            }
            factors.push(a);
        }

        if matches!(regularization, Regularization::FixedScalar) {
            // Unit offset keeps log-energies finite even at full rank.
            let lambda = T::Real::one() + discarded_mass / <T::Real as RealScalar>::from_usize(k);
            regularization_terms = vec![lambda; k];
        }

        Ok(Self {
            factors,
            regularization: regularization_terms,
            dimension: n,
            rank,
        })
    }

    /// Number of matrices in the batch (K).
    pub fn batch_size(&self) -> usize {
        self.factors.len()
    }

    /// Ambient dimension of the problem (N).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Factor rank (S).
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The current factors, one N×S matrix per input.
    pub fn factors(&self) -> &[DMatrix<T>] {
        &self.factors
    }

    /// Per-matrix regularization terms (constant across the batch in
    /// fixed-scalar mode).
    pub fn regularization(&self) -> &[T::Real] {
        &self.regularization
    }

    /// Applies a rotation to every factor in parallel: `A_i <- R A_i`.
    pub fn rotate(&mut self, rotation: &DMatrix<T>) {
        self.factors.par_iter_mut().for_each(|a| {
            *a = rotation * &*a;
        });
    }
}

/// Verifies `C == C^H` within tolerance via the mean squared deviation of
/// `C - C^H`, matching the validation the optimizer relies on for a real
/// spectrum.
fn check_hermitian<T: Scalar>(c: &DMatrix<T>, index: usize) -> Result<()> {
    let n = c.nrows();
    let deviation = c - c.adjoint();
    let msd = deviation
        .iter()
        .map(|z| z.modulus_squared())
        .fold(T::Real::zero(), |acc, v| acc + v)
        / <T::Real as RealScalar>::from_usize(n * n);
    if msd > T::Real::HERMITIAN_TOLERANCE {
        return Err(JadocError::invalid_input(format!(
            "matrix {} is not symmetric/Hermitian (mean squared deviation {:.3e})",
            index,
            msd.to_f64()
        )));
    }
    Ok(())
}
