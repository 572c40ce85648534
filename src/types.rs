//! Core types for applicant-harvest

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One candidate summary as returned by the listing endpoint.
///
/// The listing payload is opaque apart from the identifier field, so
/// summaries stay as raw JSON objects. `serde_json` is built with
/// `preserve_order`, which keeps field order stable through flattening.
pub type CandidateSummary = Map<String, Value>;

/// One flat output record: field name to scalar value.
///
/// After flattening no nested structures remain, and writes to an existing
/// field name overwrite the earlier value (last write wins).
pub type CandidateRecord = Map<String, Value>;

/// Identifier field used on placeholder records and as the primary
/// identifier key in listing summaries.
pub const ID_FIELD: &str = "Candidate Serial";

/// Accepted identifier keys in a listing summary, in priority order.
pub const ID_KEYS: [&str; 3] = [ID_FIELD, "id", "candidate_id"];

/// Marker field set on a record when the detail fetch failed.
pub const DETAIL_ERROR_FIELD: &str = "detail_fetch_error";

/// Marker field set on a record built from a summary without a usable id.
pub const SUMMARY_ERROR_FIELD: &str = "summary_error";

/// Outcome of one chunked run, reported by the run driver.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of records collected and handed to the exporter
    pub records_collected: usize,

    /// Highest page index attempted this run (None if no page was attempted)
    pub last_page: Option<u32>,

    /// Page the next run will resume from
    pub next_page: u32,

    /// Whether the crawl is now complete (no further runs will act)
    pub completed: bool,

    /// Path of the export file written for this run, if any
    pub export_path: Option<PathBuf>,
}
