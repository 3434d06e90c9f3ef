//! One-shot screening pass against a synthetic frame.

use super::{CommandResult, make_screener};

pub fn run(containers: usize, db: Option<&str>, seed: Option<u64>, json: bool) -> CommandResult {
    let mut screener = make_screener(db, seed)?;
    let frame = screener.synth_frame(containers);
    let report = screener.screen(&frame)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Quayscan v{}", quayscan_core::VERSION);
    println!();
    println!("  timestamp        {}", report.timestamp);
    println!("  anomaly          {:.1}%", report.anomaly_rate);
    println!("  entropy rate     {:+.4e}", report.entropy_rate);
    println!("  seized           {:.1} kg", report.seized_kg);
    println!("  fidelity aborts  {}", report.fidelity_aborts);
    let flagged = report.threat_mask.iter().filter(|&&f| f).count();
    println!(
        "  threat mask      {flagged}/{} states flagged",
        report.threat_mask.len()
    );
    println!("  hmac             {}", report.hmac);
    Ok(())
}
