//! End-to-end screening pass.
//!
//! Orchestration order: manifest weights → fusion score → density-matrix
//! sequence → entropy score → fidelity gate → policy step → seized quantity →
//! audit row. The report carries the anomaly as a percentage, matching the
//! wire shape the `/scan` endpoint has always returned.

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::audit::AuditStore;
use crate::config::ScreenConfig;
use crate::entropy::{self, EntropyOutcome};
use crate::error::Result;
use crate::fusion;
use crate::manifest;
use crate::policy::{InterdictionPolicy, PolicyStep};
use crate::quantum::DensityMatrix;
use crate::signal::{self, SensorFrame};

/// Result of one screening pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub timestamp: String,
    /// Combined anomaly score as a percentage. Not clamped: fidelity
    /// penalties can push this past 100.
    pub anomaly_rate: f64,
    /// Aggregate entropy-rate signal.
    pub entropy_rate: f64,
    /// Derived seized quantity, 100 * anomaly * seized_factor.
    pub seized_kg: f64,
    /// Keyed integrity tag over (anomaly, entropy, seized).
    pub hmac: String,
    /// Per-observed-state flag: high entropy while the frame itself looks
    /// calm.
    pub threat_mask: Vec<bool>,
    /// Number of adjacent state pairs that tripped the fidelity gate.
    pub fidelity_aborts: usize,
}

/// Stateful screener: policy table, audit ledger, and seeded RNG.
pub struct Screener {
    cfg: ScreenConfig,
    policy: InterdictionPolicy,
    store: AuditStore,
    rng: StdRng,
}

impl Screener {
    pub fn new(cfg: ScreenConfig, store: AuditStore) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let policy = InterdictionPolicy::new(&cfg);
        Self {
            cfg,
            policy,
            store,
            rng,
        }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.cfg
    }

    pub fn policy(&self) -> &InterdictionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &AuditStore {
        &self.store
    }

    /// Generate a synthetic frame from the screener's RNG.
    pub fn synth_frame(&mut self, n: usize) -> SensorFrame {
        signal::synth_frame(n, &self.cfg, &mut self.rng)
    }

    /// Run the full pipeline over one frame, logging an audit row.
    ///
    /// Comms signatures come from a smoothed THz detector trace, chunked into
    /// one vector per observed state and rescaled to unit range.
    pub fn screen(&mut self, frame: &SensorFrame) -> Result<ScanReport> {
        let states: Vec<DensityMatrix> = (0..self.cfg.quantum_states)
            .map(|_| DensityMatrix::random(2, &mut self.rng))
            .collect();
        let comms = self.comms_signatures();
        self.screen_with_states(frame, &states, Some(&comms))
    }

    fn comms_signatures(&mut self) -> Vec<Vec<f64>> {
        let trace = signal::thz_trace(&self.cfg, &mut self.rng);
        let sigma = self.cfg.nep * self.cfg.bandwidth_hz.sqrt();
        let c = self.cfg.comms_channels;
        (0..self.cfg.quantum_states)
            .map(|k| {
                trace
                    .iter()
                    .cycle()
                    .skip(k * c)
                    .take(c)
                    .map(|&x| (0.5 + x / (4.0 * sigma)).clamp(0.0, 1.0))
                    .collect()
            })
            .collect()
    }

    /// Pipeline with an explicit state sequence (tests and replays).
    pub fn screen_with_states(
        &mut self,
        frame: &SensorFrame,
        states: &[DensityMatrix],
        comms: Option<&[Vec<f64>]>,
    ) -> Result<ScanReport> {
        let weights = manifest::declared_weights(&frame.manifests);
        let fused = fusion::fuse(
            &frame.mag,
            &frame.grav,
            &frame.labels,
            Some(&frame.locations),
            Some(&weights),
            &self.cfg,
        )?;

        let ent: EntropyOutcome = entropy::pattern_of_life(states, comms, &self.cfg)?;
        let (anomaly, fidelity_aborts) =
            entropy::apply_fidelity_gate(fused.anomaly, states, &self.cfg)?;

        let _step: PolicyStep = self.policy.observe(anomaly, &mut self.rng);

        let threat_mask: Vec<bool> = ent
            .state_entropies_bits
            .iter()
            .map(|&s| s > self.cfg.threat_entropy_floor && anomaly < self.cfg.threat_anomaly_ceiling)
            .collect();

        let seized = 100.0 * anomaly * self.cfg.seized_factor;
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let record = self
            .store
            .append(&timestamp, anomaly, ent.entropy_rate, seized)?;

        Ok(ScanReport {
            timestamp,
            anomaly_rate: anomaly * 100.0,
            entropy_rate: ent.entropy_rate,
            seized_kg: seized,
            hmac: record.hmac,
            threat_mask,
            fidelity_aborts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screener(seed: u64) -> Screener {
        let mut cfg = ScreenConfig::default();
        cfg.seed = Some(seed);
        let store = AuditStore::open_in_memory(cfg.hmac_key.as_bytes()).unwrap();
        Screener::new(cfg, store)
    }

    #[test]
    fn screen_writes_one_audit_row_per_pass() {
        let mut s = screener(42);
        let frame = s.synth_frame(50);
        s.screen(&frame).unwrap();
        s.screen(&frame).unwrap();
        assert_eq!(s.store().count().unwrap(), 2);
    }

    #[test]
    fn report_fields_are_consistent() {
        let mut s = screener(7);
        let frame = s.synth_frame(80);
        let report = s.screen(&frame).unwrap();
        let anomaly = report.anomaly_rate / 100.0;
        assert!((report.seized_kg - 100.0 * anomaly * 0.8).abs() < 1e-9);
        assert_eq!(report.threat_mask.len(), s.config().quantum_states);
        assert!(report.anomaly_rate >= 0.0);
        // Tag verifies against the stored row.
        let rows = s.store().recent(1).unwrap();
        assert!(s.store().verify(&rows[0]));
    }

    #[test]
    fn seeded_screeners_agree_on_scores() {
        let mut a = screener(1234);
        let mut b = screener(1234);
        let fa = a.synth_frame(60);
        let fb = b.synth_frame(60);
        let ra = a.screen(&fa).unwrap();
        let rb = b.screen(&fb).unwrap();
        assert_eq!(ra.anomaly_rate, rb.anomaly_rate);
        assert_eq!(ra.entropy_rate, rb.entropy_rate);
        assert_eq!(ra.fidelity_aborts, rb.fidelity_aborts);
    }

    #[test]
    fn empty_frame_is_rejected() {
        let mut s = screener(5);
        let frame = SensorFrame {
            mag: vec![],
            grav: vec![],
            labels: vec![],
            locations: vec![],
            manifests: vec![],
        };
        assert!(s.screen(&frame).is_err());
        // Nothing was audited.
        assert_eq!(s.store().count().unwrap(), 0);
    }

    #[test]
    fn policy_sees_every_pass() {
        let mut s = screener(99);
        for _ in 0..4 {
            let frame = s.synth_frame(40);
            s.screen(&frame).unwrap();
        }
        assert_eq!(s.policy().reward_history().len(), 4);
    }
}
