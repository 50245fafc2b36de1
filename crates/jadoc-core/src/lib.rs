//! Joint Approximate Diagonalization under Orthogonality Constraints.
//!
//! This crate finds a single linear transformation B that simultaneously
//! makes a batch of symmetric/Hermitian positive-semidefinite matrices as
//! close to diagonal as possible: `B C_i B^H ≈ diagonal` for all i. Joint
//! diagonalization is a building block of blind source separation, factor
//! analysis, and related multivariate methods where covariance-like
//! matrices from different data slices must share one basis.
//!
//! # Algorithm
//!
//! Each input is compressed once into a low-rank factor `A_i` with
//! `A_i A_i^H ≈ C_i`. A regularized log-energy objective over the factor
//! rows is then minimized by a diagonal-Hessian quasi-Newton method on the
//! unitary/orthogonal group: the skew-Hermitian search direction generates
//! a matrix-exponential retraction, a golden-section line search picks the
//! step, and the factors and the running transform are rotated in place.
//!
//! # Modules
//!
//! - [`callback`]: progress-observer trait and implementations
//! - [`diagonalizer`]: configuration, result type, and the iteration loop
//! - [`engine`]: objective, gradient, and curvature evaluation
//! - [`error`]: error taxonomy
//! - [`factor`]: factor construction and regularization
//! - [`linesearch`]: golden-section search along the retraction
//! - [`types`]: scalar abstractions over the real and complex domains
//!
//! # Example
//!
//! ```
//! use jadoc_core::prelude::*;
//! use nalgebra::DMatrix;
//!
//! let c = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
//! let config = JadocConfig::new().with_rank(2);
//! let result = joint_diagonalize(std::slice::from_ref(&c), &config).unwrap();
//! assert_eq!(result.transform.nrows(), 2);
//! ```

pub mod callback;
pub mod diagonalizer;
pub mod engine;
pub mod error;
pub mod factor;
pub mod linesearch;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items at the crate root
pub use diagonalizer::{
    joint_diagonalize, joint_diagonalize_with_observer, JadocConfig, JadocResult,
    TerminationReason,
};
pub use error::{JadocError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use jadoc_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        IterationInfo, NoOpObserver, PrintProgressObserver, ProgressObserver, RecordingObserver,
    };
    pub use crate::diagonalizer::{
        joint_diagonalize, joint_diagonalize_with_observer, JadocConfig, JadocResult,
        TerminationReason,
    };
    pub use crate::engine::Evaluation;
    pub use crate::error::{JadocError, Result};
    pub use crate::factor::{FactorSet, Regularization, SpectrumMode};
    pub use crate::types::{RealScalar, Scalar};
}
