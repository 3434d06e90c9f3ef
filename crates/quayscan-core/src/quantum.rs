//! Density matrices and quantum-information measures.
//!
//! All states here are synthetic. A [`DensityMatrix`] wraps a complex
//! Hermitian matrix and exposes the measures the entropy scorer consumes:
//! von Neumann entropy, Uhlmann fidelity, trace distance, and an l1-style
//! coherence sum. Everything reduces to Hermitian eigendecompositions.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use rand::Rng;

use crate::error::{Result, ScreenError};
use crate::signal::sample_standard_normal;

/// Eigenvalues at or below this are treated as exact zeros by the base-2
/// entropy.
const EIGEN_FLOOR: f64 = 1e-12;

/// A quantum state as a Hermitian matrix.
///
/// Construction does not force trace 1: outer-product signature matrices are
/// deliberately unnormalized, matching the comms-entropy fold they feed.
#[derive(Debug, Clone)]
pub struct DensityMatrix {
    inner: DMatrix<Complex64>,
}

impl DensityMatrix {
    /// Wrap an explicit matrix. Must be square with a positive real trace.
    pub fn from_matrix(m: DMatrix<Complex64>) -> Result<Self> {
        if !m.is_square() || m.nrows() == 0 {
            return Err(ScreenError::InvalidState(format!(
                "expected nonempty square matrix, got {}x{}",
                m.nrows(),
                m.ncols()
            )));
        }
        if m.trace().re <= EIGEN_FLOOR {
            return Err(ScreenError::InvalidState(
                "trace must be positive".to_string(),
            ));
        }
        Ok(Self { inner: m })
    }

    /// Random trace-1 state of dimension `n` (Ginibre construction:
    /// ρ = GG† / tr GG†).
    pub fn random(n: usize, rng: &mut impl Rng) -> Self {
        let g = DMatrix::from_fn(n, n, |_, _| {
            Complex64::new(
                sample_standard_normal(rng),
                sample_standard_normal(rng),
            )
        });
        let mut rho = &g * g.adjoint();
        let tr = rho.trace().re;
        rho /= Complex64::new(tr, 0.0);
        Self { inner: rho }
    }

    /// Unnormalized outer product |v⟩⟨v| of a real signature vector.
    pub fn from_signal(signal: &[f64]) -> Result<Self> {
        if signal.is_empty() {
            return Err(ScreenError::InvalidState(
                "empty signature vector".to_string(),
            ));
        }
        let v = DVector::from_iterator(
            signal.len(),
            signal.iter().map(|&x| Complex64::new(x, 0.0)),
        );
        let m = &v * v.adjoint();
        Self::from_matrix(m)
    }

    pub fn dim(&self) -> usize {
        self.inner.nrows()
    }

    pub fn as_matrix(&self) -> &DMatrix<Complex64> {
        &self.inner
    }

    /// Real eigenvalue spectrum (Hermitian part).
    pub fn eigenvalues(&self) -> Vec<f64> {
        self.inner
            .clone()
            .symmetric_eigen()
            .eigenvalues
            .iter()
            .copied()
            .collect()
    }

    /// Von Neumann entropy in bits: S = -Σ λ log2 λ over eigenvalues above
    /// the zero floor.
    pub fn entropy_bits(&self) -> f64 {
        -self
            .eigenvalues()
            .iter()
            .filter(|&&l| l > EIGEN_FLOOR)
            .map(|&l| l * l.log2())
            .sum::<f64>()
    }

    /// Natural-log entropy with the historical +1e-10 regularizer, applied to
    /// every eigenvalue. Used for the comms-signature fold.
    pub fn entropy_nat_regularized(&self) -> f64 {
        -self
            .eigenvalues()
            .iter()
            .map(|&l| {
                let shifted = l + 1e-10;
                if shifted > 0.0 { l * shifted.ln() } else { 0.0 }
            })
            .sum::<f64>()
    }

    /// Sum of off-diagonal magnitudes (l1 coherence).
    pub fn coherence(&self) -> f64 {
        let n = self.dim();
        let mut acc = 0.0;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    acc += self.inner[(i, j)].norm();
                }
            }
        }
        acc
    }

    /// Hermitian square root via eigendecomposition, negative eigenvalues
    /// clamped to zero.
    fn sqrtm(&self) -> DMatrix<Complex64> {
        let eig = self.inner.clone().symmetric_eigen();
        let n = self.dim();
        let d = DMatrix::from_diagonal(&DVector::from_iterator(
            n,
            eig.eigenvalues
                .iter()
                .map(|&l| Complex64::new(l.max(0.0).sqrt(), 0.0)),
        ));
        &eig.eigenvectors * d * eig.eigenvectors.adjoint()
    }
}

/// Uhlmann fidelity F = Tr sqrt(√ρ1 ρ2 √ρ1). 1 for identical states, 0 for
/// orthogonal ones.
pub fn fidelity(a: &DensityMatrix, b: &DensityMatrix) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(ScreenError::InvalidState(format!(
            "dimension mismatch: {} vs {}",
            a.dim(),
            b.dim()
        )));
    }
    let sa = a.sqrtm();
    let m = &sa * b.as_matrix() * &sa;
    let eig = m.symmetric_eigen();
    Ok(eig.eigenvalues.iter().map(|&l| l.max(0.0).sqrt()).sum())
}

/// Trace distance D = ½ Σ |λ(ρ1 - ρ2)|.
pub fn trace_distance(a: &DensityMatrix, b: &DensityMatrix) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(ScreenError::InvalidState(format!(
            "dimension mismatch: {} vs {}",
            a.dim(),
            b.dim()
        )));
    }
    let diff = a.as_matrix() - b.as_matrix();
    let eig = diff.symmetric_eigen();
    Ok(0.5 * eig.eigenvalues.iter().map(|l| l.abs()).sum::<f64>())
}
