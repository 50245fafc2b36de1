//! Type definitions and scalar abstractions for joint diagonalization.
//!
//! This module provides the scalar traits that let one engine cover the
//! real-symmetric and complex-Hermitian problem domains, together with
//! per-precision numerical constants.

use nalgebra::{Complex, ComplexField, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for real scalar types used in optimization (f32 or f64).
///
/// Tolerances and iteration thresholds are always real-valued, even when the
/// input matrices are complex, so they are attached to this trait.
pub trait RealScalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Default tolerance on the RMS gradient magnitude for convergence.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Default floor applied to the diagonal curvature approximation.
    const DEFAULT_CURVATURE_FLOOR: Self;

    /// Tolerance for the symmetry/Hermitian input check (mean squared
    /// deviation of `C - C^H`).
    const HERMITIAN_TOLERANCE: Self;

    /// Tolerance for checking that a transform is unitary/orthogonal.
    const UNITARITY_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a
    /// non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for iteration and batch counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl RealScalar for f32 {
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-3;
    const DEFAULT_CURVATURE_FLOOR: Self = 1e-2;
    const HERMITIAN_TOLERANCE: Self = 1e-5;
    const UNITARITY_TOLERANCE: Self = 1e-4;
}

impl RealScalar for f64 {
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-4;
    const DEFAULT_CURVATURE_FLOOR: Self = 1e-2;
    const HERMITIAN_TOLERANCE: Self = 1e-12;
    const UNITARITY_TOLERANCE: Self = 1e-8;
}

/// Trait for field scalars the engine operates on.
///
/// Implemented for `f32`/`f64` (real symmetric inputs) and
/// `Complex<f32>`/`Complex<f64>` (Hermitian inputs). The engine is written
/// once against this trait; the skew-Hermitian algebra specializes to
/// skew-symmetric algebra in the real case.
pub trait Scalar:
    ComplexField<RealField = <Self as Scalar>::Real> + Copy + Send + Sync + 'static
{
    /// The real field carrying tolerances, losses, and diagonal energies.
    type Real: RealScalar;
}

impl Scalar for f32 {
    type Real = f32;
}

impl Scalar for f64 {
    type Real = f64;
}

impl Scalar for Complex<f32> {
    type Real = f32;
}

impl Scalar for Complex<f64> {
    type Real = f64;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = nalgebra::DMatrix<T>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = nalgebra::DVector<T>;

/// Numerical constants of the algorithm.
pub mod constants {
    use super::RealScalar;

    /// Golden-section ratio `2 / (1 + sqrt(5))`.
    pub fn golden_section_theta<R: RealScalar>() -> R {
        <R as RealScalar>::from_f64(2.0 / (1.0 + 5.0_f64.sqrt()))
    }

    /// Euler's number (e), used by the log-warped step mapping.
    pub fn e<R: RealScalar>() -> R {
        <R as RealScalar>::from_f64(std::f64::consts::E)
    }
}
