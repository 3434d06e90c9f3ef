//! Start the HTTP screening server.

use super::{CommandResult, make_screener};

pub fn run(host: &str, port: u16, db: Option<&str>, seed: Option<u64>) -> CommandResult {
    let screener = make_screener(db, seed)?;

    let base = format!("http://{host}:{port}");
    println!("Quayscan Server v{}", quayscan_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET  /          API index (try: curl {base})");
    println!("     POST /scan      Run one screening pass");
    println!("     GET  /health    Ledger health check");
    println!();
    println!("   Example:");
    println!("     curl -X POST -H 'Content-Type: application/json' -d '{{}}' {base}/scan");
    println!();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(quayscan_server::run_server(screener, host, port));
    Ok(())
}
