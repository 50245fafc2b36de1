//! The joint-diagonalization iteration loop.
//!
//! Ties the pieces together: build the factors once, then alternate
//! loss/gradient evaluation, golden-section line search, and the
//! matrix-exponential update `B <- exp(step * U) B` until the RMS gradient
//! drops below tolerance or the iteration budget runs out. Exhausting the
//! budget is not an error: the best transform found is still returned,
//! flagged as non-converged.

use crate::callback::{IterationInfo, NoOpObserver, ProgressObserver};
use crate::engine;
use crate::error::{JadocError, Result};
use crate::factor::{FactorSet, Regularization, SpectrumMode};
use crate::linesearch;
use crate::types::{DMatrix, RealScalar, Scalar};
use num_traits::{Float, One, Zero};
use std::time::{Duration, Instant};

/// Reason the iteration loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// RMS gradient magnitude dropped below tolerance after the minimum
    /// iteration count
    Converged,
    /// Iteration budget exhausted without meeting the gradient tolerance;
    /// non-fatal
    MaxIterations,
}

/// Configuration for the joint diagonalizer.
#[derive(Debug, Clone)]
pub struct JadocConfig<T: Scalar> {
    /// Factor rank S; `None` defaults to `ceil(N / K)`
    pub rank: Option<usize>,

    /// Starting value for the transformation; `None` means identity
    pub seed: Option<DMatrix<T>>,

    /// Maximum number of iterations
    pub max_iterations: usize,

    /// Minimum number of iterations before convergence is tested
    pub min_iterations: usize,

    /// Stop once the RMS gradient magnitude falls below this value
    pub gradient_tolerance: T::Real,

    /// Floor applied to the diagonal curvature approximation
    pub curvature_floor: T::Real,

    /// Regularization style for the diagonal energies
    pub regularization: Regularization<T::Real>,

    /// Negative-eigenvalue handling during factor construction
    pub spectrum: SpectrumMode,

    /// Number of golden-section bracket refinements per iteration
    pub line_search_refinements: usize,
}

impl<T: Scalar> Default for JadocConfig<T> {
    fn default() -> Self {
        Self {
            rank: None,
            seed: None,
            max_iterations: 100,
            min_iterations: 10,
            gradient_tolerance: T::Real::DEFAULT_GRADIENT_TOLERANCE,
            curvature_floor: T::Real::DEFAULT_CURVATURE_FLOOR,
            regularization: Regularization::default(),
            spectrum: SpectrumMode::default(),
            line_search_refinements: linesearch::DEFAULT_REFINEMENTS,
        }
    }
}

impl<T: Scalar> JadocConfig<T> {
    /// Creates a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the factor rank.
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Sets the starting transformation.
    pub fn with_seed(mut self, seed: DMatrix<T>) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the minimum iteration count before convergence is tested.
    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    /// Sets the RMS-gradient convergence tolerance.
    pub fn with_gradient_tolerance(mut self, tolerance: T::Real) -> Self {
        self.gradient_tolerance = tolerance;
        self
    }

    /// Sets the curvature floor.
    pub fn with_curvature_floor(mut self, floor: T::Real) -> Self {
        self.curvature_floor = floor;
        self
    }

    /// Sets the regularization style.
    pub fn with_regularization(mut self, regularization: Regularization<T::Real>) -> Self {
        self.regularization = regularization;
        self
    }

    /// Sets the negative-eigenvalue handling.
    pub fn with_spectrum(mut self, spectrum: SpectrumMode) -> Self {
        self.spectrum = spectrum;
        self
    }

    /// Sets the golden-section refinement count.
    pub fn with_line_search_refinements(mut self, refinements: usize) -> Self {
        self.line_search_refinements = refinements;
        self
    }

    /// Checks the configuration for parameter errors.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(JadocError::invalid_configuration(
                "iteration budget must be positive",
                "max_iterations",
                self.max_iterations,
            ));
        }
        if !(self.gradient_tolerance > T::Real::zero()) {
            return Err(JadocError::invalid_configuration(
                "gradient tolerance must be positive",
                "gradient_tolerance",
                self.gradient_tolerance,
            ));
        }
        if !(self.curvature_floor > T::Real::zero()) {
            return Err(JadocError::invalid_configuration(
                "curvature floor must be positive",
                "curvature_floor",
                self.curvature_floor,
            ));
        }
        if self.line_search_refinements == 0 {
            return Err(JadocError::invalid_configuration(
                "at least one bracket refinement is required",
                "line_search_refinements",
                self.line_search_refinements,
            ));
        }
        if let Some(0) = self.rank {
            return Err(JadocError::invalid_configuration(
                "rank must be positive",
                "rank",
                0,
            ));
        }
        if let Regularization::Shrinkage { alpha } = self.regularization {
            if alpha < T::Real::zero() || alpha > T::Real::one() {
                return Err(JadocError::invalid_configuration(
                    "shrinkage strength must lie in [0, 1]",
                    "alpha",
                    alpha,
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of a joint diagonalization run.
#[derive(Debug, Clone)]
pub struct JadocResult<T: Scalar> {
    /// The transformation B such that `B C_i B^H` is approximately diagonal
    /// for every input; unitary/orthogonal up to numerical drift
    pub transform: DMatrix<T>,

    /// True if the gradient tolerance was met within the budget
    pub converged: bool,

    /// Number of update steps performed
    pub iterations: usize,

    /// Objective value at termination
    pub final_loss: T::Real,

    /// RMS gradient magnitude at termination
    pub final_rms_gradient: T::Real,

    /// Why the loop stopped
    pub termination_reason: TerminationReason,

    /// Wall-clock time elapsed
    pub duration: Duration,
}

/// Jointly diagonalizes a batch of symmetric/Hermitian matrices.
///
/// Returns the transformation B minimizing the regularized log-energy
/// objective, together with convergence diagnostics. Non-convergence within
/// the iteration budget is reported through `converged` and
/// `termination_reason`, not as an error.
///
/// # Errors
///
/// `InvalidConfiguration` for parameter errors (raised before any
/// iteration), `InvalidInput` for malformed or non-Hermitian matrices, and
/// `NumericalError` if the objective stops being finite.
pub fn joint_diagonalize<T: Scalar>(
    matrices: &[DMatrix<T>],
    config: &JadocConfig<T>,
) -> Result<JadocResult<T>> {
    let mut observer = NoOpObserver;
    joint_diagonalize_with_observer(matrices, config, &mut observer)
}

/// Variant of [`joint_diagonalize`] reporting per-iteration diagnostics to
/// an observer.
pub fn joint_diagonalize_with_observer<T: Scalar>(
    matrices: &[DMatrix<T>],
    config: &JadocConfig<T>,
    observer: &mut dyn ProgressObserver<T::Real>,
) -> Result<JadocResult<T>> {
    let start = Instant::now();
    config.validate()?;
    if matrices.is_empty() {
        return Err(JadocError::invalid_configuration(
            "at least one input matrix is required",
            "matrices",
            "[]",
        ));
    }

    let n = matrices[0].nrows();
    let k = matrices.len();
    let rank = config.rank.unwrap_or_else(|| n.div_ceil(k));

    let mut factors = FactorSet::build(
        matrices,
        rank,
        config.spectrum,
        config.regularization,
        config.seed.as_ref(),
    )?;
    let mut transform = config
        .seed
        .clone()
        .unwrap_or_else(|| DMatrix::identity(n, n));

    observer.on_start(k, n, rank);

    let mut iterations = 0usize;
    let (termination_reason, final_loss, final_rms_gradient) = loop {
        let eval = engine::evaluate(&factors, config.curvature_floor);
        if !<T::Real as Float>::is_finite(eval.loss) {
            return Err(JadocError::numerical_error("objective is no longer finite"));
        }

        if eval.rms_gradient < config.gradient_tolerance && iterations >= config.min_iterations {
            break (TerminationReason::Converged, eval.loss, eval.rms_gradient);
        }
        if iterations >= config.max_iterations {
            break (TerminationReason::MaxIterations, eval.loss, eval.rms_gradient);
        }

        let step =
            linesearch::golden_section_step(&factors, &eval.direction, config.line_search_refinements);
        let rotation = eval.direction.scale(step).exp();
        transform = &rotation * transform;
        factors.rotate(&rotation);

        observer.on_iteration(&IterationInfo {
            iteration: iterations,
            loss: eval.loss,
            rms_gradient: eval.rms_gradient,
            step_size: step,
        });
        iterations += 1;
    };

    let converged = termination_reason == TerminationReason::Converged;
    observer.on_end(converged, iterations);

    Ok(JadocResult {
        transform,
        converged,
        iterations,
        final_loss,
        final_rms_gradient,
        termination_reason,
        duration: start.elapsed(),
    })
}
