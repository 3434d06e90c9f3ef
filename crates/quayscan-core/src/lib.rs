//! # quayscan-core
//!
//! **Simulated quantum sensor fusion for maritime cargo screening.**
//!
//! `quayscan-core` implements the full screening pass over a synthetic cargo
//! frame: magnetometer/gravimeter fusion against declared manifests, a
//! pattern-of-life entropy score over a short sequence of density matrices, a
//! fidelity gate that penalizes unstable state transitions, a tabular
//! interdiction policy stub, and an HMAC-signed SQLite audit ledger.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quayscan_core::{AuditStore, ScreenConfig, Screener, signal};
//!
//! let cfg = ScreenConfig::default();
//! let store = AuditStore::open_in_memory(cfg.hmac_key.as_bytes()).unwrap();
//! let mut screener = Screener::new(cfg, store);
//!
//! let frame = screener.synth_frame(100);
//! let report = screener.screen(&frame).unwrap();
//! println!("anomaly {:.1}%, seized {:.1} kg", report.anomaly_rate, report.seized_kg);
//! ```
//!
//! ## Architecture
//!
//! Frame → Fusion scorer → Entropy scorer → Fidelity gate → Policy step → Audit
//!
//! The combination rule is deliberately unnormalized: the fusion score is a
//! misclassification rate plus a manifest-discrepancy flag rate, the entropy
//! rate folds three divergence measures, and each low-fidelity transition
//! multiplies the running anomaly score by a fixed penalty. Scores can and do
//! exceed 1.0; callers treat them as relative signals, not probabilities.
//!
//! All synthetic data generation is seeded, so demo runs reproduce exactly.

pub mod audit;
pub mod config;
pub mod entropy;
pub mod error;
pub mod fusion;
pub mod manifest;
pub mod pipeline;
pub mod policy;
pub mod quantum;
pub mod signal;

pub use audit::{AuditRecord, AuditStore};
pub use config::ScreenConfig;
pub use entropy::{EntropyOutcome, apply_fidelity_gate, pattern_of_life};
pub use error::{Result, ScreenError};
pub use fusion::{FusionOutcome, fuse};
pub use manifest::declared_weights;
pub use pipeline::{ScanReport, Screener};
pub use policy::{InterdictionPolicy, PolicyStep};
pub use quantum::DensityMatrix;
pub use signal::SensorFrame;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
