pub mod audits;
pub mod demo;
pub mod scan;
pub mod serve;

use quayscan_core::{AuditStore, ScreenConfig, Screener};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Build a screener over the file-backed audit ledger.
pub fn make_screener(db: Option<&str>, seed: Option<u64>) -> Result<Screener, Box<dyn std::error::Error>> {
    let mut cfg = ScreenConfig::default();
    if seed.is_some() {
        cfg.seed = seed;
    }
    let path = db.unwrap_or(&cfg.audit_db_path).to_string();
    let store = AuditStore::open(&path, cfg.hmac_key.as_bytes())?;
    Ok(Screener::new(cfg, store))
}
