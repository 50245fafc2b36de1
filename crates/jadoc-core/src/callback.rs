//! Progress-observer support for the diagonalization loop.
//!
//! This module provides a trait for observing the optimization process.
//! Observers can be used for logging, diagnostics collection, or progress
//! display; the engine itself never prints.

use crate::types::RealScalar;

/// Per-iteration diagnostics passed to observers.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationInfo<R: RealScalar> {
    /// Zero-based iteration index
    pub iteration: usize,

    /// Objective value at the start of the iteration
    pub loss: R,

    /// RMS magnitude of the off-diagonal gradient entries
    pub rms_gradient: R,

    /// Step size accepted by the golden-section line search
    pub step_size: R,
}

/// Trait for observing joint-diagonalization progress.
///
/// All methods have no-op defaults, so implementors only override what they
/// need.
pub trait ProgressObserver<R: RealScalar> {
    /// Called once after the factors have been built, before iterating.
    fn on_start(&mut self, batch_size: usize, dimension: usize, rank: usize) {
        let _ = (batch_size, dimension, rank);
    }

    /// Called at the end of each accepted iteration.
    fn on_iteration(&mut self, info: &IterationInfo<R>) {
        let _ = info;
    }

    /// Called once when the loop terminates, with the convergence outcome.
    fn on_end(&mut self, converged: bool, iterations: usize) {
        let _ = (converged, iterations);
    }
}

/// A no-op observer that does nothing.
#[derive(Debug, Clone, Default)]
pub struct NoOpObserver;

impl<R: RealScalar> ProgressObserver<R> for NoOpObserver {
    // Use default implementations
}

/// An observer that prints progress to stdout.
#[derive(Debug, Clone)]
pub struct PrintProgressObserver {
    print_every: usize,
}

impl PrintProgressObserver {
    /// Create a new progress printing observer.
    pub fn new(print_every: usize) -> Self {
        Self {
            print_every: print_every.max(1),
        }
    }
}

impl Default for PrintProgressObserver {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<R: RealScalar> ProgressObserver<R> for PrintProgressObserver {
    fn on_start(&mut self, batch_size: usize, dimension: usize, rank: usize) {
        println!(
            "Jointly diagonalizing {} matrices of size {}x{} (factor rank {})",
            batch_size, dimension, dimension, rank
        );
    }

    fn on_iteration(&mut self, info: &IterationInfo<R>) {
        if info.iteration % self.print_every == 0 {
            println!(
                "ITER {}: L={:.6}, RMSD(g)={:.6e}, step={:.3}",
                info.iteration,
                info.loss.to_f64(),
                info.rms_gradient.to_f64(),
                info.step_size.to_f64()
            );
        }
    }

    fn on_end(&mut self, converged: bool, iterations: usize) {
        if converged {
            println!("Converged after {} iterations", iterations);
        } else {
            println!(
                "WARNING: no convergence within {} iterations; returning best transform",
                iterations
            );
        }
    }
}

/// An observer that records every iteration, useful in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver<R: RealScalar> {
    /// Diagnostics of every accepted iteration, in order.
    pub history: Vec<IterationInfo<R>>,
}

impl<R: RealScalar> RecordingObserver<R> {
    /// Create an empty recording observer.
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }
}

impl<R: RealScalar> ProgressObserver<R> for RecordingObserver<R> {
    fn on_iteration(&mut self, info: &IterationInfo<R>) {
        self.history.push(info.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer() {
        let mut observer = RecordingObserver::<f64>::new();
        observer.on_start(3, 10, 4);
        observer.on_iteration(&IterationInfo {
            iteration: 0,
            loss: 1.5,
            rms_gradient: 0.1,
            step_size: 0.3,
        });
        observer.on_end(true, 1);

        assert_eq!(observer.history.len(), 1);
        assert_eq!(observer.history[0].iteration, 0);
    }

    #[test]
    fn test_noop_observer_compiles_for_both_precisions() {
        let mut o = NoOpObserver;
        ProgressObserver::<f32>::on_end(&mut o, true, 5);
        ProgressObserver::<f64>::on_end(&mut o, false, 100);
    }
}
