//! Objective, gradient, and curvature evaluation.
//!
//! The regularized log-determinant style objective
//! `L = (1/2K) * sum_{i,n} ln(d_i[n])`, with `d_i` the diagonal energies of
//! the rotated factors, drives all off-diagonal energy of `B C_i B^H`
//! toward zero while the regularization term keeps the diagonal bounded
//! away from zero. The Riemannian gradient is the skew-Hermitian part of
//! the accumulated factor outer products; the Hessian is approximated by an
//! elementwise ratio of diagonal energies, which makes the quasi-Newton
//! direction a simple elementwise quotient.

use crate::factor::FactorSet;
use crate::types::{DMatrix, DVector, RealScalar, Scalar};
use num_traits::{Float, One, Zero};
use rayon::prelude::*;

/// Output of a full loss/gradient/curvature evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation<T: Scalar> {
    /// Objective value at the current factors
    pub loss: T::Real,

    /// RMS magnitude of the gradient over off-diagonal entries; the
    /// convergence statistic
    pub rms_gradient: T::Real,

    /// Skew-Hermitian quasi-Newton search direction `U = -G / H`
    pub direction: DMatrix<T>,
}

/// Computes per-matrix diagonal energies: squared row norms of each factor
/// plus its regularization term. Strictly positive whenever the term is.
pub fn diagonal_energies<T: Scalar>(
    factors: &[DMatrix<T>],
    regularization: &[T::Real],
) -> Vec<DVector<T::Real>> {
    factors
        .iter()
        .zip(regularization)
        .map(|(a, &term)| {
            DVector::from_iterator(
                a.nrows(),
                a.row_iter().map(|row| {
                    row.iter()
                        .map(|z| z.modulus_squared())
                        .fold(T::Real::zero(), |acc, v| acc + v)
                        + term
                }),
            )
        })
        .collect()
}

/// Loss-only fast path used inside the line search: skips gradient and
/// curvature entirely.
pub fn loss_only<T: Scalar>(factors: &[DMatrix<T>], regularization: &[T::Real]) -> T::Real {
    let energies = diagonal_energies(factors, regularization);
    loss_from_energies::<T>(&energies)
}

fn loss_from_energies<T: Scalar>(energies: &[DVector<T::Real>]) -> T::Real {
    let k = <T::Real as RealScalar>::from_usize(energies.len());
    let half = <T::Real as RealScalar>::from_f64(0.5);
    let mut log_sum = T::Real::zero();
    for d in energies {
        for &v in d.iter() {
            log_sum += <T::Real as Float>::ln(v);
        }
    }
    half * log_sum / k
}

/// Full evaluation: loss, RMS gradient, and quasi-Newton direction.
///
/// The per-matrix gradient contributions are independent, so they are
/// accumulated as a rayon map-reduce over per-thread partial sums.
pub fn evaluate<T: Scalar>(set: &FactorSet<T>, curvature_floor: T::Real) -> Evaluation<T> {
    let factors = set.factors();
    let regularization = set.regularization();
    let n = set.dimension();
    let k = factors.len();
    let k_real = <T::Real as RealScalar>::from_usize(k);

    let energies = diagonal_energies(factors, regularization);
    let loss = loss_from_energies::<T>(&energies);

    // F = (1/K) sum_i (A_i / d_i) A_i^H, rowwise scaling by 1/d_i.
    let f_sum = factors
        .par_iter()
        .zip(energies.par_iter())
        .map(|(a, d)| {
            let mut scaled = a.clone();
            for r in 0..n {
                let inv = T::from_real(T::Real::one() / d[r]);
                let mut row = scaled.row_mut(r);
                row *= inv;
            }
            &scaled * a.adjoint()
        })
        .reduce(|| DMatrix::<T>::zeros(n, n), |x, y| x + y);
    let f = f_sum.unscale(k_real);
    let g = &f - f.adjoint();

    let rms_gradient = if n > 1 {
        let g_sq = g
            .iter()
            .map(|z| z.modulus_squared())
            .fold(T::Real::zero(), |acc, v| acc + v);
        <T::Real as Float>::sqrt(g_sq / <T::Real as RealScalar>::from_usize(n * (n - 1)))
    } else {
        T::Real::zero()
    };

    // H[p,q] = mean_i d_i[p]/d_i[q], symmetrized and floored.
    let mut ratio_sum = DMatrix::<T::Real>::zeros(n, n);
    for d in &energies {
        for p in 0..n {
            for q in 0..n {
                ratio_sum[(p, q)] += d[p] / d[q];
            }
        }
    }
    let two = <T::Real as RealScalar>::from_f64(2.0);
    let curvature = DMatrix::<T::Real>::from_fn(n, n, |p, q| {
        let h = ratio_sum[(p, q)] / k_real + ratio_sum[(q, p)] / k_real - two;
        <T::Real as Float>::max(h, curvature_floor)
    });

    // U = -G / H elementwise; skew-Hermitian because G is and H is symmetric.
    let direction = DMatrix::from_fn(n, n, |p, q| {
        -g[(p, q)] * T::from_real(T::Real::one() / curvature[(p, q)])
    });

    Evaluation {
        loss,
        rms_gradient,
        direction,
    }
}
