//! Seeded generation of joint-diagonalization test problems.
//!
//! Builds batches of random symmetric/Hermitian matrices that share an
//! approximate common eigenbasis: a shared Gaussian matrix is blended with
//! a per-matrix one, antisymmetrized and exponentiated into a rotation, and
//! applied to a random (optionally squared, hence PSD) diagonal. Higher
//! blending weights make the batch closer to exactly jointly
//! diagonalizable. Also provides the off-diagonal RMS diagnostic used to
//! judge diagonalization quality.

use crate::types::{DMatrix, RealScalar, Scalar};
use nalgebra::Complex;
use num_traits::{Float, Zero};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

fn gaussian_matrix(rng: &mut StdRng, n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |_, _| StandardNormal.sample(rng))
}

fn gaussian_matrix_complex(rng: &mut StdRng, n: usize) -> DMatrix<Complex<f64>> {
    DMatrix::from_fn(n, n, |_, _| {
        Complex::new(StandardNormal.sample(rng), StandardNormal.sample(rng))
    })
}

fn random_spectrum(rng: &mut StdRng, n: usize, psd: bool) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let v: f64 = StandardNormal.sample(rng);
            if psd {
                v * v
            } else {
                v
            }
        })
        .collect()
}

/// `R * diag(spectrum) * R^H` with the columns of `R` scaled in place.
fn assemble<T: Scalar>(rotation: &DMatrix<T>, spectrum: &[f64]) -> DMatrix<T> {
    let mut scaled = rotation.clone();
    for (j, &d) in spectrum.iter().enumerate() {
        let mut col = scaled.column_mut(j);
        col *= T::from_real(<T::Real as RealScalar>::from_f64(d));
    }
    &scaled * rotation.adjoint()
}

/// Simulates `k` real symmetric matrices of size `n` sharing an approximate
/// eigenbasis.
///
/// `mixing` in `[0, 1]` controls how close the batch is to exactly jointly
/// diagonalizable (1 = identical eigenbasis); `psd` squares the spectra so
/// every matrix is positive semidefinite.
pub fn simulate_symmetric(
    k: usize,
    n: usize,
    seed: u64,
    mixing: f64,
    psd: bool,
) -> Vec<DMatrix<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let shared = gaussian_matrix(&mut rng, n);
    (0..k)
        .map(|_| {
            let own = gaussian_matrix(&mut rng, n);
            let blended = shared.scale(mixing) + own.scale(1.0 - mixing);
            let rotation = (&blended - blended.transpose()).exp();
            let spectrum = random_spectrum(&mut rng, n, psd);
            assemble(&rotation, &spectrum)
        })
        .collect()
}

/// Simulates `k` complex Hermitian matrices of size `n` sharing an
/// approximate eigenbasis; see [`simulate_symmetric`].
pub fn simulate_hermitian(
    k: usize,
    n: usize,
    seed: u64,
    mixing: f64,
    psd: bool,
) -> Vec<DMatrix<Complex<f64>>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let shared = gaussian_matrix_complex(&mut rng, n);
    (0..k)
        .map(|_| {
            let own = gaussian_matrix_complex(&mut rng, n);
            let blended = shared.scale(mixing) + own.scale(1.0 - mixing);
            let rotation = (&blended - blended.adjoint()).exp();
            let spectrum = random_spectrum(&mut rng, n, psd);
            assemble(&rotation, &spectrum)
        })
        .collect()
}

/// Root-mean-square magnitude of the off-diagonal entries of the batch,
/// optionally after applying a transform: `B C_i B^H`.
pub fn off_diagonal_rms<T: Scalar>(
    matrices: &[DMatrix<T>],
    transform: Option<&DMatrix<T>>,
) -> T::Real {
    assert!(!matrices.is_empty());
    let n = matrices[0].nrows();
    let k = matrices.len();
    if n < 2 {
        return T::Real::zero();
    }

    let mut sum = T::Real::zero();
    for c in matrices {
        let d = match transform {
            Some(b) => (b * c) * b.adjoint(),
            None => c.clone(),
        };
        for p in 0..n {
            for q in 0..n {
                if p != q {
                    sum += d[(p, q)].modulus_squared();
                }
            }
        }
    }
    <T::Real as Float>::sqrt(sum / <T::Real as RealScalar>::from_usize(n * (n - 1) * k))
}

/// Deviation of `B B^H` from the identity, as a Frobenius norm.
pub fn unitarity_deviation<T: Scalar>(transform: &DMatrix<T>) -> T::Real {
    let n = transform.nrows();
    let gram = transform * transform.adjoint();
    (gram - DMatrix::<T>::identity(n, n)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_matrices_are_symmetric() {
        let matrices = simulate_symmetric(3, 8, 42, 0.9, true);
        assert_eq!(matrices.len(), 3);
        for c in &matrices {
            assert!((c - c.transpose()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_psd_spectra_are_nonnegative() {
        let matrices = simulate_symmetric(2, 6, 7, 0.5, true);
        for c in &matrices {
            let eig = nalgebra::SymmetricEigen::new(c.clone());
            for &v in eig.eigenvalues.iter() {
                assert!(v > -1e-10);
            }
        }
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let a = simulate_symmetric(2, 5, 123, 0.8, true);
        let b = simulate_symmetric(2, 5, 123, 0.8, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hermitian_simulation() {
        let matrices = simulate_hermitian(2, 5, 11, 0.9, true);
        for c in &matrices {
            assert!((c - c.adjoint()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_off_diagonal_rms_of_diagonal_batch_is_zero() {
        let d = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![1.0, 2.0, 3.0]));
        let rms = off_diagonal_rms(std::slice::from_ref(&d), None);
        assert!(rms < 1e-14);
    }

    #[test]
    fn test_unitarity_deviation_of_identity_is_zero() {
        let b = DMatrix::<f64>::identity(4, 4);
        assert!(unitarity_deviation(&b) < 1e-14);
    }
}
