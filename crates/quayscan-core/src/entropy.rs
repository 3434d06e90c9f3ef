//! Pattern-of-life entropy scoring and the fidelity gate.
//!
//! The entropy scorer watches a short sequence of density matrices and folds
//! three divergence measures into one rate: von Neumann entropy differences,
//! coherence-change rate, and trace-distance rate, optionally plus a comms
//! signature entropy term. The whole entropy term zeroes out unless at least
//! one raw entropy rate clears the `tau` threshold.
//!
//! The fidelity gate runs over the same sequence: every adjacent pair whose
//! fidelity drops below the threshold multiplies the running anomaly score by
//! the penalty constant, exactly once per qualifying pair. The product is
//! unbounded by design; scores above 1.0 are expected under repeated aborts.

use crate::config::ScreenConfig;
use crate::error::{Result, ScreenError};
use crate::quantum::{self, DensityMatrix};

/// Entropy scorer output.
#[derive(Debug, Clone)]
pub struct EntropyOutcome {
    /// Combined entropy-rate signal.
    pub entropy_rate: f64,
    /// Per-state von Neumann entropy in bits, for the threat mask.
    pub state_entropies_bits: Vec<f64>,
}

/// Score a sequence of at least two density matrices.
pub fn pattern_of_life(
    states: &[DensityMatrix],
    comms_signatures: Option<&[Vec<f64>]>,
    cfg: &ScreenConfig,
) -> Result<EntropyOutcome> {
    if states.len() < 2 {
        return Err(ScreenError::InvalidInput(format!(
            "entropy scoring needs at least 2 states, got {}",
            states.len()
        )));
    }

    let entropies: Vec<f64> = states.iter().map(DensityMatrix::entropy_bits).collect();
    let rates: Vec<f64> = entropies
        .windows(2)
        .map(|w| (w[1] - w[0]) / cfg.dt)
        .collect();
    let mut entropy_rate = if rates.iter().any(|&r| r > cfg.tau) {
        mean(&rates)
    } else {
        0.0
    };

    let coherences: Vec<f64> = states.iter().map(DensityMatrix::coherence).collect();
    let coherence_rates: Vec<f64> = coherences
        .windows(2)
        .map(|w| (w[1] - w[0]) / cfg.dt)
        .collect();
    let mut tracedist_rates = Vec::with_capacity(states.len() - 1);
    for pair in states.windows(2) {
        tracedist_rates.push(quantum::trace_distance(&pair[0], &pair[1])? / cfg.dt);
    }
    entropy_rate += mean(&coherence_rates) + mean(&tracedist_rates);

    if let Some(sigs) = comms_signatures {
        let mut comm_entropies = Vec::with_capacity(sigs.len());
        for sig in sigs {
            comm_entropies.push(DensityMatrix::from_signal(sig)?.entropy_nat_regularized());
        }
        if comm_entropies.len() >= 2 {
            let diffs: Vec<f64> = comm_entropies.windows(2).map(|w| w[1] - w[0]).collect();
            entropy_rate += mean(&diffs);
            log::info!("pattern-of-life disturbance folded in: {entropy_rate:.4}");
        }
    }

    Ok(EntropyOutcome {
        entropy_rate,
        state_entropies_bits: entropies,
    })
}

/// Apply the fidelity gate to a running anomaly score.
///
/// Returns the gated score and the number of aborts. Each adjacent pair with
/// F below `cfg.fidelity_threshold` applies `cfg.fidelity_penalty` once.
pub fn apply_fidelity_gate(
    anomaly: f64,
    states: &[DensityMatrix],
    cfg: &ScreenConfig,
) -> Result<(f64, usize)> {
    let mut gated = anomaly;
    let mut aborts = 0;
    for pair in states.windows(2) {
        let f = quantum::fidelity(&pair[0], &pair[1])?;
        if f < cfg.fidelity_threshold {
            log::warn!(
                "fidelity abort: F={f:.3} < {:.2}, anomaly uplifted",
                cfg.fidelity_threshold
            );
            gated *= cfg.fidelity_penalty;
            aborts += 1;
        }
    }
    Ok((gated, aborts))
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};
    use num_complex::Complex64;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn diag2(a: f64, b: f64) -> DensityMatrix {
        DensityMatrix::from_matrix(DMatrix::from_diagonal(&DVector::from_vec(vec![
            Complex64::new(a, 0.0),
            Complex64::new(b, 0.0),
        ])))
        .unwrap()
    }

    #[test]
    fn too_short_sequence_is_rejected() {
        let cfg = ScreenConfig::default();
        let states = vec![diag2(0.5, 0.5)];
        assert!(pattern_of_life(&states, None, &cfg).is_err());
    }

    #[test]
    fn identical_states_score_zero() {
        let cfg = ScreenConfig::default();
        let states = vec![diag2(0.5, 0.5), diag2(0.5, 0.5), diag2(0.5, 0.5)];
        let out = pattern_of_life(&states, None, &cfg).unwrap();
        // No entropy rate clears tau, coherence and trace distance are flat.
        assert!(out.entropy_rate.abs() < 1e-9);
        assert_eq!(out.state_entropies_bits.len(), 3);
    }

    #[test]
    fn entropy_term_zeroes_below_tau() {
        let mut cfg = ScreenConfig::default();
        // Entropy falls (rates negative), so the entropy term must zero; only
        // coherence/trace-distance terms remain, and for diagonal states the
        // coherence term is zero too.
        cfg.dt = 1.0;
        let states = vec![diag2(0.5, 0.5), diag2(0.9, 0.1)];
        let out = pattern_of_life(&states, None, &cfg).unwrap();
        let expected = quantum::trace_distance(&states[0], &states[1]).unwrap();
        assert!((out.entropy_rate - expected).abs() < 1e-9);
    }

    #[test]
    fn rising_entropy_contributes_above_tau() {
        let mut cfg = ScreenConfig::default();
        cfg.dt = 1.0;
        cfg.tau = 0.01;
        let states = vec![diag2(1.0, 0.0), diag2(0.5, 0.5)];
        let out = pattern_of_life(&states, None, &cfg).unwrap();
        // Entropy rises 0 → 1 bit; rate 1.0 > tau, plus trace distance 0.5.
        assert!((out.entropy_rate - 1.5).abs() < 1e-9);
    }

    #[test]
    fn gate_applies_penalty_once_per_qualifying_pair() {
        let cfg = ScreenConfig::default();
        // Orthogonal pure states: F = 0 for both adjacent pairs.
        let states = vec![diag2(1.0, 0.0), diag2(0.0, 1.0), diag2(1.0, 0.0)];
        let (gated, aborts) = apply_fidelity_gate(0.5, &states, &cfg).unwrap();
        assert_eq!(aborts, 2);
        assert!((gated - 0.5 * 1.2 * 1.2).abs() < 1e-12);
    }

    #[test]
    fn gate_leaves_stable_sequences_alone() {
        let cfg = ScreenConfig::default();
        let states = vec![diag2(0.5, 0.5), diag2(0.5, 0.5)];
        let (gated, aborts) = apply_fidelity_gate(0.7, &states, &cfg).unwrap();
        assert_eq!(aborts, 0);
        assert_eq!(gated, 0.7);
    }

    #[test]
    fn gated_score_can_exceed_one() {
        // Documents the defect the combination rule carries: the penalty
        // product is unbounded, so anomaly scores escape [0, 1].
        let cfg = ScreenConfig::default();
        let states: Vec<DensityMatrix> = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    diag2(1.0, 0.0)
                } else {
                    diag2(0.0, 1.0)
                }
            })
            .collect();
        let (gated, aborts) = apply_fidelity_gate(0.9, &states, &cfg).unwrap();
        assert_eq!(aborts, 5);
        assert!(gated > 1.0);
    }

    #[test]
    fn comms_fold_shifts_the_rate() {
        let cfg = ScreenConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let states: Vec<DensityMatrix> =
            (0..4).map(|_| DensityMatrix::random(2, &mut rng)).collect();
        let base = pattern_of_life(&states, None, &cfg).unwrap();
        let sigs: Vec<Vec<f64>> = vec![vec![0.1; 5], vec![0.9; 5]];
        let folded = pattern_of_life(&states, Some(&sigs), &cfg).unwrap();
        assert!((folded.entropy_rate - base.entropy_rate).abs() > 1e-12);
    }
}
