//! Sensor fusion scorer.
//!
//! Concatenates the magnetometer and gravimeter channels (plus a
//! location-derived distance feature when present) into one feature vector per
//! container, fits an RBF-kernel classifier in place on the same data it
//! scores, and combines the misclassification rate with a manifest-discrepancy
//! flag rate:
//!
//! ```text
//! anomaly = m + d,   m, d ∈ [0, 1]
//! ```
//!
//! The sum is intentionally unnormalized (it can reach 2.0 before the fidelity
//! gate even runs); downstream consumers treat it as a relative signal.
//!
//! The classifier is a kernel density scorer evaluated on its own training
//! data — the historical pipeline fit an SVM and predicted on the training
//! set, so there is no train/test split to preserve here.

use crate::config::ScreenConfig;
use crate::error::{Result, ScreenError};

/// Fusion scorer output.
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    /// In-place misclassification rate m.
    pub misclassification: f64,
    /// Fraction of containers whose sensor mass disagrees with the manifest
    /// beyond tolerance (d). Zero when no manifest weights were supplied.
    pub manifest_flag_rate: f64,
    /// Mean |sensor mass − declared weight| across the frame.
    pub mean_mass_delta: f64,
    /// Combined score m + d.
    pub anomaly: f64,
}

/// Fuse one frame of parallel channels into an anomaly score.
pub fn fuse(
    mag: &[f64],
    grav: &[f64],
    labels: &[u8],
    locations: Option<&[[f64; 2]]>,
    manifest_weights: Option<&[f64]>,
    cfg: &ScreenConfig,
) -> Result<FusionOutcome> {
    let n = mag.len();
    if n == 0 {
        return Err(ScreenError::InvalidInput("empty sensor frame".to_string()));
    }
    if grav.len() != n || labels.len() != n {
        return Err(ScreenError::InvalidInput(format!(
            "channel lengths disagree: mag={n}, grav={}, labels={}",
            grav.len(),
            labels.len()
        )));
    }
    if let Some(locs) = locations {
        if locs.len() != n {
            return Err(ScreenError::InvalidInput(format!(
                "locations length {} != frame length {n}",
                locs.len()
            )));
        }
    }
    if let Some(w) = manifest_weights {
        if w.len() != n {
            return Err(ScreenError::InvalidInput(format!(
                "manifest weights length {} != frame length {n}",
                w.len()
            )));
        }
    }

    // Column-stack features, then z-score each column so the kernel width is
    // meaningful across channels with wildly different physical scales.
    let mut features: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row = vec![mag[i], grav[i]];
            if let Some(locs) = locations {
                row.push((locs[i][0].powi(2) + locs[i][1].powi(2)).sqrt());
            }
            row
        })
        .collect();
    standardize(&mut features);

    let predictions = kernel_predict(&features, labels, cfg.rbf_gamma);
    let misclassification = labels
        .iter()
        .zip(&predictions)
        .filter(|(l, p)| l != p)
        .count() as f64
        / n as f64;

    let (manifest_flag_rate, mean_mass_delta) = match manifest_weights {
        Some(weights) => {
            let deltas: Vec<f64> = grav
                .iter()
                .zip(weights)
                .map(|(&g, &w)| (g * cfg.grav_mass_scale - w).abs())
                .collect();
            let flagged =
                deltas.iter().filter(|&&d| d > cfg.manifest_tolerance).count() as f64 / n as f64;
            let mean_delta = deltas.iter().sum::<f64>() / n as f64;
            if flagged > 0.0 {
                log::warn!("manifest mismatch: mean delta {mean_delta:.4}, flag rate {flagged:.2}");
            }
            (flagged, mean_delta)
        }
        None => (0.0, 0.0),
    };

    Ok(FusionOutcome {
        misclassification,
        manifest_flag_rate,
        mean_mass_delta,
        anomaly: misclassification + manifest_flag_rate,
    })
}

/// Z-score each feature column in place. Constant columns are left centered.
fn standardize(features: &mut [Vec<f64>]) {
    let n = features.len();
    let dims = features[0].len();
    for d in 0..dims {
        let mean = features.iter().map(|f| f[d]).sum::<f64>() / n as f64;
        let var = features.iter().map(|f| (f[d] - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();
        for f in features.iter_mut() {
            f[d] = if std > 1e-12 { (f[d] - mean) / std } else { 0.0 };
        }
    }
}

/// RBF kernel density classification against the training set itself.
///
/// Each sample is assigned the class whose members are, on average, closest
/// under the kernel exp(-gamma * ||x - y||^2).
fn kernel_predict(features: &[Vec<f64>], labels: &[u8], gamma: f64) -> Vec<u8> {
    let classes: Vec<u8> = {
        let mut cs: Vec<u8> = labels.to_vec();
        cs.sort_unstable();
        cs.dedup();
        cs
    };

    features
        .iter()
        .map(|x| {
            let mut best = (classes[0], f64::NEG_INFINITY);
            for &c in &classes {
                let mut acc = 0.0;
                let mut count = 0usize;
                for (y, &l) in features.iter().zip(labels) {
                    if l == c {
                        acc += (-gamma * sq_dist(x, y)).exp();
                        count += 1;
                    }
                }
                let score = acc / count as f64;
                if score > best.1 {
                    best = (c, score);
                }
            }
            best.0
        })
        .collect()
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScreenConfig {
        ScreenConfig::default()
    }

    #[test]
    fn separable_frame_scores_clean() {
        // Two well-separated clusters labeled consistently: no
        // misclassification, no manifests supplied.
        let mag: Vec<f64> = (0..20)
            .map(|i| if i < 10 { 1.0 } else { 100.0 })
            .collect();
        let grav = mag.clone();
        let labels: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();
        let out = fuse(&mag, &grav, &labels, None, None, &cfg()).unwrap();
        assert_eq!(out.misclassification, 0.0);
        assert_eq!(out.anomaly, 0.0);
    }

    #[test]
    fn manifest_discrepancy_adds_to_the_score() {
        let c = cfg();
        let n = 10;
        let mag = vec![1e-9; n];
        // Sensor mass 50 kg exactly.
        let grav = vec![50.0 / c.grav_mass_scale; n];
        let labels = vec![0u8; n];
        // Half the manifests declare 100 kg.
        let weights: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 50.0 } else { 100.0 }).collect();
        let out = fuse(&mag, &grav, &labels, None, Some(&weights), &c).unwrap();
        assert_eq!(out.misclassification, 0.0);
        assert!((out.manifest_flag_rate - 0.5).abs() < 1e-12);
        assert!((out.anomaly - 0.5).abs() < 1e-12);
        assert!(out.mean_mass_delta > 0.0);
    }

    #[test]
    fn combined_score_can_reach_two() {
        // Adversarial labeling (identical features, alternating labels) plus
        // total manifest disagreement drives m + d toward 2.0 — the rule is
        // unnormalized and this documents it.
        let c = cfg();
        let n = 8;
        let mag = vec![1.0; n];
        let grav = vec![1.0; n];
        let labels: Vec<u8> = (0..n).map(|i| (i % 2) as u8).collect();
        let weights = vec![1e9; n];
        let out = fuse(&mag, &grav, &labels, None, Some(&weights), &c).unwrap();
        assert_eq!(out.manifest_flag_rate, 1.0);
        // Identical features: one class must eat every prediction, so half
        // the labels mismatch.
        assert!((out.misclassification - 0.5).abs() < 1e-12);
        assert!(out.anomaly > 1.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let c = cfg();
        let err = fuse(&[1.0, 2.0], &[1.0], &[0, 0], None, None, &c);
        assert!(matches!(err, Err(ScreenError::InvalidInput(_))));
        let err = fuse(
            &[1.0, 2.0],
            &[1.0, 2.0],
            &[0, 0],
            Some(&[[0.0, 0.0]]),
            None,
            &c,
        );
        assert!(matches!(err, Err(ScreenError::InvalidInput(_))));
        let err = fuse(&[], &[], &[], None, None, &c);
        assert!(matches!(err, Err(ScreenError::InvalidInput(_))));
    }

    #[test]
    fn location_feature_participates() {
        // Same mag/grav everywhere; only location separates the classes.
        let n = 20;
        let mag = vec![1.0; n];
        let grav = vec![1.0; n];
        let labels: Vec<u8> = (0..n).map(|i| u8::from(i >= 10)).collect();
        let locs: Vec<[f64; 2]> = (0..n)
            .map(|i| if i < 10 { [0.1, 0.1] } else { [50.0, 50.0] })
            .collect();
        let out = fuse(&mag, &grav, &labels, Some(&locs), None, &cfg()).unwrap();
        assert_eq!(out.misclassification, 0.0);
    }
}
