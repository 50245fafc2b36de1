//! End-to-end tests of the joint diagonalizer on simulated batches.

use approx::assert_relative_eq;
use jadoc::nalgebra::DMatrix;
use jadoc::prelude::*;
use jadoc_core::test_utils::{off_diagonal_rms, simulate_hermitian, simulate_symmetric, unitarity_deviation};

#[test]
fn single_matrix_reduces_to_eigendecomposition() {
    // With K=1 the problem is an ordinary eigendecomposition; the optimal
    // transform diagonalizes the input regardless of the seed.
    let matrices = simulate_symmetric(1, 8, 101, 0.0, true);
    let pre = off_diagonal_rms(&matrices, None);

    // Close eigenvalues flatten the curvature near the optimum, so the
    // gradient tail is slow; 1e-7 is reachable where 1e-8 stalls.
    let config = JadocConfig::new()
        .with_rank(8)
        .with_gradient_tolerance(1e-7)
        .with_max_iterations(1000);
    let result = joint_diagonalize(&matrices, &config).unwrap();

    assert!(result.converged);
    let post = off_diagonal_rms(&matrices, Some(&result.transform));
    assert!(post < 1e-2, "post-transform RMS {} too large", post);
    assert!(post < pre / 50.0);

    // Same outcome from a non-trivial orthogonal seed.
    let skew = DMatrix::from_fn(8, 8, |p, q| 0.05 * (p as f64 - q as f64));
    let seed = skew.exp();
    let seeded = joint_diagonalize(&matrices, &config.clone().with_seed(seed)).unwrap();
    assert!(seeded.converged);
    let post_seeded = off_diagonal_rms(&matrices, Some(&seeded.transform));
    assert!(post_seeded < 1e-2);
}

#[test]
fn seeded_scenario_reduces_off_diagonal_energy_tenfold() {
    // K=5 random 50x50 real symmetric PSD matrices, default options. The
    // batch shares one eigenbasis up to a small PSD perturbation, so a
    // strong joint diagonalizer exists for the optimizer to find.
    let shared = simulate_symmetric(5, 50, 15_348_091, 1.0, true);
    let noise = simulate_symmetric(5, 50, 77, 0.0, true);
    let matrices: Vec<DMatrix<f64>> = shared
        .iter()
        .zip(&noise)
        .map(|(c, p)| c + p.scale(5e-3))
        .collect();
    let pre = off_diagonal_rms(&matrices, None);

    let result = joint_diagonalize(&matrices, &JadocConfig::default()).unwrap();

    assert!(result.converged, "expected convergence within 100 iterations");
    assert!(result.iterations <= 100);
    let post = off_diagonal_rms(&matrices, Some(&result.transform));
    assert!(
        post * 10.0 <= pre,
        "off-diagonal RMS only went from {} to {}",
        pre,
        post
    );
}

#[test]
fn transform_stays_orthogonal_throughout() {
    let matrices = simulate_symmetric(4, 20, 7, 0.8, true);
    let result = joint_diagonalize(&matrices, &JadocConfig::default()).unwrap();
    assert!(unitarity_deviation(&result.transform) < 1e-6);
}

#[test]
fn complex_hermitian_batch_yields_unitary_transform() {
    let matrices = simulate_hermitian(3, 10, 23, 0.9, true);
    let result = joint_diagonalize(&matrices, &JadocConfig::default()).unwrap();

    assert!(unitarity_deviation(&result.transform) < 1e-6);
    let pre = off_diagonal_rms(&matrices, None);
    let post = off_diagonal_rms(&matrices, Some(&result.transform));
    assert!(post < pre);
}

#[test]
fn loss_is_monotonically_non_increasing() {
    let matrices = simulate_symmetric(4, 16, 3, 0.85, true);
    let mut observer = RecordingObserver::new();
    joint_diagonalize_with_observer(&matrices, &JadocConfig::default(), &mut observer).unwrap();

    assert!(observer.history.len() >= 2);
    for pair in observer.history.windows(2) {
        assert!(
            pair[1].loss <= pair[0].loss + 1e-6,
            "loss increased from {} to {}",
            pair[0].loss,
            pair[1].loss
        );
    }
}

#[test]
fn already_diagonal_batch_converges_immediately() {
    let matrices: Vec<DMatrix<f64>> = (0..3)
        .map(|i| {
            DMatrix::from_fn(6, 6, |p, q| {
                if p == q {
                    1.0 + ((i * 6 + p) % 7) as f64
                } else {
                    0.0
                }
            })
        })
        .collect();

    let config = JadocConfig::default();
    let result = joint_diagonalize(&matrices, &config).unwrap();

    assert!(result.converged);
    assert!(result.iterations <= config.min_iterations + 1);
    // The gradient is zero from the start, so the transform never moves.
    assert_relative_eq!(result.transform, DMatrix::<f64>::identity(6, 6), epsilon = 1e-12);
}

#[test]
fn rerunning_with_returned_seed_barely_rotates() {
    let matrices = simulate_symmetric(3, 12, 77, 0.9, true);
    // Converge the first run well below the default tolerance; the second
    // run then starts inside the flat region and its forced minimum
    // iterations can only wander by tiny steps.
    let tight = JadocConfig::new()
        .with_gradient_tolerance(1e-6)
        .with_max_iterations(1000);
    let first = joint_diagonalize(&matrices, &tight).unwrap();
    assert!(first.converged);

    let config = JadocConfig::default().with_seed(first.transform.clone());
    let second = joint_diagonalize(&matrices, &config).unwrap();

    // The extra rotation on top of the converged transform is close to the
    // identity.
    let extra = &second.transform * first.transform.transpose();
    let deviation = (&extra - DMatrix::<f64>::identity(12, 12)).norm();
    assert!(deviation < 0.1, "extra rotation deviates by {}", deviation);
}

#[test]
fn fixed_scalar_regularization_handles_rank_truncation() {
    let matrices = simulate_symmetric(4, 12, 9, 0.9, true);
    let config = JadocConfig::new()
        .with_regularization(Regularization::FixedScalar)
        .with_spectrum(SpectrumMode::ClipNegative);
    let result = joint_diagonalize(&matrices, &config).unwrap();

    // Default rank here is ceil(12/4) = 3; the run must still produce an
    // orthogonal transform that reduces off-diagonal energy.
    assert!(unitarity_deviation(&result.transform) < 1e-6);
    let pre = off_diagonal_rms(&matrices, None);
    let post = off_diagonal_rms(&matrices, Some(&result.transform));
    assert!(post < pre);
}
