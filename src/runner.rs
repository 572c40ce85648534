//! Run driver: one bounded chunk of the overall crawl per invocation
//!
//! An external scheduler (cron, CI, a timer) invokes the driver repeatedly;
//! each invocation loads the progress state, harvests at most one run's
//! worth of records from its page window, hands them to the exporter and
//! advances the durable cursor. Once the cursor passes the page ceiling the
//! crawl is complete and further invocations are no-ops.

use crate::client::ApiClient;
use crate::collector::collect_until;
use crate::config::Config;
use crate::error::Result;
use crate::export::{CsvExporter, Exporter};
use crate::listing::fetch_total_pages;
use crate::state::ProgressState;
use crate::types::RunReport;
use std::sync::Arc;
use tracing::{error, info};

/// Executes chunked harvest runs against one configured platform tenant.
pub struct HarvestRunner {
    config: Config,
    client: ApiClient,
    exporter: Arc<dyn Exporter>,
}

impl HarvestRunner {
    /// Build a runner with the bundled CSV exporter.
    ///
    /// # Errors
    ///
    /// Fails fast on missing credentials or an invalid base URL — no network
    /// call is attempted with a bad configuration.
    pub fn new(config: Config) -> Result<Self> {
        let exporter = Arc::new(CsvExporter::new(config.output_dir.clone()));
        Self::with_exporter(config, exporter)
    }

    /// Build a runner handing batches to a custom export collaborator.
    ///
    /// # Errors
    ///
    /// Same validation as [`HarvestRunner::new`].
    pub fn with_exporter(config: Config, exporter: Arc<dyn Exporter>) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config,
            client,
            exporter,
        })
    }

    /// Execute one chunked run.
    ///
    /// Individual page and candidate failures never abort the run; the only
    /// error paths out of here are state-file persistence problems. The
    /// progress state is persisted at the end of every run, no-ops included.
    ///
    /// # Errors
    ///
    /// Returns an error when the progress state cannot be written.
    pub async fn run_once(&self) -> Result<RunReport> {
        let state_path = self.config.state_file.as_path();
        let mut state = ProgressState::load(state_path);

        if state.completed {
            info!("crawl already completed earlier, nothing to do");
            state.save(state_path)?;
            return Ok(RunReport {
                next_page: state.current_page,
                completed: true,
                ..RunReport::default()
            });
        }

        // Resolve the page total exactly once and cache it in the state file
        let total_pages = match state.total_pages {
            Some(total) => total,
            None => {
                let total = fetch_total_pages(&self.client).await;
                state.total_pages = Some(total);
                state.save(state_path)?;
                total
            }
        };

        let max_page = total_pages.min(self.config.max_page);

        if state.current_page > max_page {
            info!(max_page, "already past the page ceiling, stopping");
            state.completed = true;
            state.save(state_path)?;
            return Ok(RunReport {
                next_page: state.current_page,
                completed: true,
                ..RunReport::default()
            });
        }

        info!(
            target = self.config.records_per_run,
            from_page = state.current_page,
            to_page = max_page,
            "collecting records for this run"
        );

        let outcome = collect_until(
            &self.client,
            self.config.records_per_run,
            state.current_page,
            max_page,
            self.config.max_workers,
        )
        .await;

        // A failed export loses this run's file but never the crawl position
        let export_path = match self.exporter.export(&outcome.records).await {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "export failed, keeping page progress");
                None
            }
        };

        let attempted = outcome.last_page >= state.current_page;
        if attempted {
            state.current_page = outcome.last_page + 1;
        }
        if state.current_page > max_page {
            state.completed = true;
            info!(max_page, "target last page reached");
        }
        state.save(state_path)?;

        info!(
            next_page = state.current_page,
            limit_page = max_page,
            completed = state.completed,
            "run finished"
        );

        Ok(RunReport {
            records_collected: outcome.records.len(),
            last_page: attempted.then_some(outcome.last_page),
            next_page: state.current_page,
            completed: state.completed,
            export_path,
        })
    }
}
