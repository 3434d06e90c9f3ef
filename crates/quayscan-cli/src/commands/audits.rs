//! Inspect the audit ledger: recent rows plus integrity verification.

use quayscan_core::{AuditStore, ScreenConfig};

use super::CommandResult;

pub fn run(db: Option<&str>, limit: usize) -> CommandResult {
    let cfg = ScreenConfig::default();
    let path = db.unwrap_or(&cfg.audit_db_path);
    let store = AuditStore::open(path, cfg.hmac_key.as_bytes())?;

    let total = store.count()?;
    let rows = store.recent(limit)?;
    println!("{total} audit row(s) in {path}, showing {}:\n", rows.len());
    println!(
        "  {:<20} {:>9} {:>12} {:>10}  {}",
        "timestamp", "anomaly", "entropy", "seized kg", "tag"
    );
    for row in &rows {
        let ok = if store.verify(row) { "ok" } else { "TAMPERED" };
        println!(
            "  {:<20} {:>9.4} {:>12.4e} {:>10.1}  {}... {}",
            row.timestamp,
            row.anomaly,
            row.entropy,
            row.seized,
            &row.hmac[..12.min(row.hmac.len())],
            ok
        );
    }
    Ok(())
}
