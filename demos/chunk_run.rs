//! Chunked harvest run example
//!
//! This example is the process entry a scheduler invokes (e.g. every 15
//! minutes): it loads configuration from the environment, executes exactly
//! one chunk of the crawl and exits cleanly. Run it repeatedly to walk the
//! whole listing; delete the state file to force a full re-crawl.
//!
//! Required environment: `BASE_URL`, `API_TOKEN`, `API_PUBLISHER` (a `.env`
//! file is honored). See `Config::from_env` for the optional knobs.

use applicant_harvest::{Config, HarvestRunner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present, then initialize logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("--- applicant-harvest chunk runner ---");

    let config = Config::from_env()?;
    let runner = HarvestRunner::new(config)?;

    let report = runner.run_once().await?;

    if report.completed {
        println!("✓ Crawl complete (next page would be {})", report.next_page);
    } else {
        println!(
            "✓ Collected {} records; next run resumes from page {}",
            report.records_collected, report.next_page
        );
    }
    if let Some(path) = report.export_path {
        println!("✓ Export written to {}", path.display());
    }

    Ok(())
}
