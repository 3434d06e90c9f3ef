//! Screening configuration.
//!
//! Every numeric constant that used to float around the pipeline as an inline
//! literal lives here as a named field, so the gravimeter mass scale, the
//! fidelity gate, and the policy hyperparameters can be tuned in one place.

use serde::{Deserialize, Serialize};

/// Tunable parameters for a screening pass.
///
/// Defaults reproduce the historical pipeline behavior. Deserializable so a
/// deployment can override individual fields from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// THz detector noise-equivalent power (W/√Hz).
    pub nep: f64,
    /// THz detector bandwidth (Hz). Noise sigma = nep * sqrt(bandwidth).
    pub bandwidth_hz: f64,
    /// Samples per simulated THz trace.
    pub thz_samples: usize,

    /// Gravimeter reading → sensor mass scale factor.
    ///
    /// Historical variants disagreed (1e5 vs 1e6); this field is the single
    /// source of truth, defaulting to 1e5.
    pub grav_mass_scale: f64,
    /// Sensor mass vs declared weight delta above which a row is flagged.
    pub manifest_tolerance: f64,
    /// RBF kernel width for the in-place fusion classifier.
    pub rbf_gamma: f64,

    /// Time step between density-matrix observations (s).
    pub dt: f64,
    /// Entropy-rate threshold: the entropy term zeroes unless some rate
    /// exceeds this.
    pub tau: f64,
    /// Number of density matrices in the observed sequence.
    pub quantum_states: usize,
    /// Channels per comms signature vector.
    pub comms_channels: usize,

    /// Fidelity below this aborts the pair and applies the penalty.
    pub fidelity_threshold: f64,
    /// Multiplier applied to the anomaly score once per qualifying pair.
    pub fidelity_penalty: f64,

    /// Seized-quantity factor: seized_kg = 100 * anomaly * seized_factor.
    pub seized_factor: f64,

    /// Policy table dimensions.
    pub states: usize,
    pub actions: usize,
    /// Q-learning step size.
    pub alpha: f64,
    /// Q-learning discount.
    pub gamma: f64,
    /// Epsilon-greedy exploration rate.
    pub epsilon: f64,

    /// Per-state threat mask: flagged when state entropy exceeds this floor...
    pub threat_entropy_floor: f64,
    /// ...and the combined anomaly stays below this ceiling.
    pub threat_anomaly_ceiling: f64,

    /// Key for the audit ledger HMAC tags.
    pub hmac_key: String,
    /// Audit ledger path.
    pub audit_db_path: String,

    /// RNG seed for synthetic data. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            nep: 90e-12,
            bandwidth_hz: 2.9e3,
            thz_samples: 1024,
            grav_mass_scale: 1e5,
            manifest_tolerance: 1e-3,
            rbf_gamma: 1.0,
            dt: 1e-6,
            tau: 0.01,
            quantum_states: 10,
            comms_channels: 5,
            fidelity_threshold: 0.9,
            fidelity_penalty: 1.2,
            seized_factor: 0.8,
            states: 10,
            actions: 6,
            alpha: 0.05,
            gamma: 0.999,
            epsilon: 0.03,
            threat_entropy_floor: 0.02,
            threat_anomaly_ceiling: 0.1,
            hmac_key: "mock_key".to_string(),
            audit_db_path: "quayscan_audits.db".to_string(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_constants() {
        let cfg = ScreenConfig::default();
        assert_eq!(cfg.grav_mass_scale, 1e5);
        assert_eq!(cfg.fidelity_threshold, 0.9);
        assert_eq!(cfg.fidelity_penalty, 1.2);
        assert_eq!(cfg.states, 10);
        assert_eq!(cfg.actions, 6);
    }

    #[test]
    fn partial_override_from_json() {
        let cfg: ScreenConfig =
            serde_json::from_str(r#"{"grav_mass_scale": 1e6, "tau": 0.02}"#).unwrap();
        assert_eq!(cfg.grav_mass_scale, 1e6);
        assert_eq!(cfg.tau, 0.02);
        // Everything else keeps its default.
        assert_eq!(cfg.fidelity_penalty, 1.2);
    }
}
