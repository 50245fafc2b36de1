//! Golden-section line search along the matrix-exponential retraction.
//!
//! Minimizes `loss(step)` for `step in [0, 1]` along the one-parameter
//! family `exp(step * U)` applied to the current factors. The bracket is
//! narrowed a fixed number of times rather than to a tolerance, and the
//! winning lower bound is mapped through `ln(1 + lb*(e-1))`, which biases
//! the accepted step toward smaller values near zero and stabilizes early
//! iterations where the quadratic model is least accurate. Both the fixed
//! refinement count and the warping are empirical constants of the method,
//! kept configurable but not re-derived.

use crate::engine;
use crate::factor::FactorSet;
use crate::types::{constants, DMatrix, Scalar};
use num_traits::{Float, One, Zero};
use rayon::prelude::*;

/// Default number of bracket refinements.
pub const DEFAULT_REFINEMENTS: usize = 15;

/// Rotates every factor by the given matrix, producing a candidate state.
fn rotate_all<T: Scalar>(rotation: &DMatrix<T>, factors: &[DMatrix<T>]) -> Vec<DMatrix<T>> {
    factors.par_iter().map(|a| rotation * a).collect()
}

/// Elementwise affine blend `from + t * (to - from)` across a factor state.
fn blend<T: Scalar>(from: &[DMatrix<T>], to: &[DMatrix<T>], t: T::Real) -> Vec<DMatrix<T>> {
    from.iter()
        .zip(to)
        .map(|(x, y)| x + (y - x).scale(t))
        .collect()
}

/// Runs the golden-section search and returns the accepted step size.
///
/// Four candidate factor states are kept: the bracket endpoints (step 0 and
/// the fully rotated step 1) and two interior points at golden-ratio
/// fractions. Each refinement discards the worse side, shrinks the bracket,
/// and evaluates one new interior state with the loss-only fast path.
pub fn golden_section_step<T: Scalar>(
    set: &FactorSet<T>,
    direction: &DMatrix<T>,
    refinements: usize,
) -> T::Real {
    let theta = constants::golden_section_theta::<T::Real>();
    let regularization = set.regularization();
    let rotation = direction.exp();

    let mut s0 = set.factors().to_vec();
    let mut s1 = rotate_all(&rotation, set.factors());
    let mut s2 = blend(&s1, &s0, theta);
    let mut s3 = blend(&s0, &s1, theta);

    let mut lower = T::Real::zero();
    let mut upper = T::Real::one();
    let mut loss2 = engine::loss_only::<T>(&s2, regularization);
    let mut loss3 = engine::loss_only::<T>(&s3, regularization);

    for _ in 0..refinements {
        if loss2 < loss3 {
            s1 = s3;
            s3 = s2;
            loss3 = loss2;
            upper = lower + theta * (upper - lower);
            s2 = blend(&s1, &s0, theta);
            loss2 = engine::loss_only::<T>(&s2, regularization);
        } else {
            s0 = s2;
            s2 = s3;
            loss2 = loss3;
            lower = upper - theta * (upper - lower);
            s3 = blend(&s0, &s1, theta);
            loss3 = engine::loss_only::<T>(&s3, regularization);
        }
    }

    let e = constants::e::<T::Real>();
    <T::Real as Float>::ln(T::Real::one() + lower * (e - T::Real::one()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::factor::{Regularization, SpectrumMode};

    fn spd_from(rows: usize, data: Vec<f64>) -> DMatrix<f64> {
        let x = DMatrix::from_row_slice(rows, rows, &data);
        &x * x.transpose()
    }

    fn build_set(matrices: &[DMatrix<f64>]) -> FactorSet<f64> {
        let n = matrices[0].nrows();
        FactorSet::build(
            matrices,
            n,
            SpectrumMode::ClipNegative,
            Regularization::FixedScalar,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_step_is_within_unit_interval() {
        let matrices = vec![
            spd_from(3, vec![1.0, 0.4, 0.0, 0.2, 2.0, 0.3, 0.0, 0.1, 1.0]),
            spd_from(3, vec![2.0, 0.0, 0.2, 0.3, 1.0, 0.0, 0.1, 0.0, 2.5]),
        ];
        let set = build_set(&matrices);
        let eval = engine::evaluate(&set, 1e-2);
        let step = golden_section_step(&set, &eval.direction, DEFAULT_REFINEMENTS);

        assert!(step >= 0.0);
        assert!(step <= 1.0);
    }

    #[test]
    fn test_flat_landscape_pushes_bracket_upward() {
        // A zero direction leaves every candidate state identical; the
        // search then walks its lower bound toward 1.
        let matrices = vec![spd_from(2, vec![1.0, 0.0, 0.0, 2.0])];
        let set = build_set(&matrices);
        let zero = DMatrix::<f64>::zeros(2, 2);
        let step = golden_section_step(&set, &zero, DEFAULT_REFINEMENTS);

        assert!(step > 0.9);
        assert!(step <= 1.0);
    }

    #[test]
    fn test_accepted_step_does_not_increase_loss() {
        let matrices = vec![
            spd_from(4, vec![
                1.0, 0.5, 0.0, 0.2, //
                0.3, 2.0, 0.1, 0.0, //
                0.0, 0.4, 1.5, 0.1, //
                0.2, 0.0, 0.3, 1.0,
            ]),
            spd_from(4, vec![
                2.0, 0.0, 0.1, 0.0, //
                0.1, 1.0, 0.0, 0.3, //
                0.0, 0.2, 2.5, 0.0, //
                0.4, 0.0, 0.0, 1.2,
            ]),
        ];
        let mut set = build_set(&matrices);
        let eval = engine::evaluate(&set, 1e-2);
        let before = eval.loss;

        let step = golden_section_step(&set, &eval.direction, DEFAULT_REFINEMENTS);
        let rotation = eval.direction.scale(step).exp();
        set.rotate(&rotation);
        let after = engine::loss_only::<f64>(set.factors(), set.regularization());

        assert!(after <= before + 1e-8);
    }
}
