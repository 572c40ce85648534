//! # applicant-harvest
//!
//! Resumable chunked harvesting library for paginated recruiting-platform
//! APIs.
//!
//! ## Design Philosophy
//!
//! applicant-harvest is designed to be:
//! - **Resumable** - Page-level progress survives process restarts, so a
//!   long crawl can run as many small scheduled chunks
//! - **Failure-tolerant** - Page and candidate failures degrade to skips and
//!   placeholder records; a run always exits cleanly
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Sensible defaults** - Only credentials and a base URL are required
//!
//! ## Quick Start
//!
//! ```no_run
//! use applicant_harvest::{Config, HarvestRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         base_url: "https://tenant.example.com/api".to_string(),
//!         api_token: "token".to_string(),
//!         api_publisher: "publisher".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let runner = HarvestRunner::new(config)?;
//!     let report = runner.run_once().await?;
//!     println!(
//!         "collected {} records, resuming from page {}",
//!         report.records_collected, report.next_page
//!     );
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Authenticated API client
pub mod client;
/// Concurrent batch collection over pages
pub mod collector;
/// Configuration types
pub mod config;
/// Per-candidate detail retrieval
pub mod detail;
/// Error types
pub mod error;
/// Tabular export of run batches
pub mod export;
/// Detail-payload flattening
pub mod flatten;
/// Listing pages and metadata
pub mod listing;
/// Retry logic with exponential backoff
pub mod retry;
/// Run driver for chunked invocations
pub mod runner;
/// Durable progress state
pub mod state;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::ApiClient;
pub use collector::{BatchOutcome, collect_until};
pub use config::{Config, RetryConfig};
pub use error::{Error, Result};
pub use export::{CsvExporter, Exporter};
pub use flatten::flatten_detail;
pub use runner::HarvestRunner;
pub use state::ProgressState;
pub use types::{CandidateRecord, CandidateSummary, RunReport};
