//! Error types for joint diagonalization.
//!
//! This module defines the error taxonomy used throughout the library.
//! Configuration and input-validation failures are fatal and raised before
//! any iteration begins; exhausting the iteration budget is deliberately
//! *not* an error and is reported through the result instead.

use thiserror::Error;

/// Errors that can occur while setting up or running a joint diagonalization.
#[derive(Debug, Clone, Error)]
pub enum JadocError {
    /// Invalid solver configuration.
    ///
    /// This error occurs when the solver is configured with invalid
    /// parameters (e.g., rank exceeding the matrix dimension, a seed
    /// transform of the wrong shape, a zero iteration budget).
    #[error("Invalid configuration: {reason} (parameter `{parameter}` = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// Input matrices failed validation.
    ///
    /// This error occurs when an input matrix is not square, does not match
    /// the batch dimension, or violates the symmetry/Hermitian requirement
    /// beyond numerical tolerance.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of why the input is invalid
        reason: String,
    },

    /// Numerical instability detected.
    ///
    /// This error occurs when the objective or gradient stops being finite,
    /// typically after an eigendecomposition or matrix exponential on
    /// pathological input.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl JadocError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: std::fmt::Display,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create an InvalidInput error with a custom reason.
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for joint diagonalization operations.
pub type Result<T> = std::result::Result<T, JadocError>;
