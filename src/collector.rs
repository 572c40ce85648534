//! Page-walking batch collection with bounded concurrent detail fetches
//!
//! The collector is a sequential state machine over pages. The cursor
//! advances unconditionally — a page that fails to fetch is skipped, not
//! retried at the page level — and each page's identifier set fans out to
//! the detail endpoint through a bounded worker pool. Records accumulate in
//! completion order, which is explicitly not page or dispatch order.

use crate::client::ApiClient;
use crate::detail::fetch_candidate_detail;
use crate::listing::fetch_page;
use crate::types::{CandidateRecord, CandidateSummary, ID_KEYS, SUMMARY_ERROR_FIELD};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

/// Result of one collection window
#[derive(Debug)]
pub struct BatchOutcome {
    /// Collected records, at most the requested target count
    pub records: Vec<CandidateRecord>,

    /// Highest page index actually attempted; `start_page - 1` when the
    /// window was empty and no page was attempted
    pub last_page: u32,
}

/// Walk pages from `start_page` collecting flattened candidate records until
/// the target count is reached or the page cursor passes `max_page`.
///
/// Summaries without a usable identifier are retained as placeholder records
/// tagged with a summary-error marker — nothing is silently dropped. If the
/// final page's fan-out overshoots the target, the batch is truncated to
/// exactly `target_records`.
pub async fn collect_until(
    client: &ApiClient,
    target_records: usize,
    start_page: u32,
    max_page: u32,
    max_workers: usize,
) -> BatchOutcome {
    let workers = max_workers.max(1);
    let mut batch: Vec<CandidateRecord> = Vec::new();
    let mut last_page = start_page.saturating_sub(1);
    let mut page = start_page;

    while batch.len() < target_records && page <= max_page {
        info!(page, "processing page");
        let summaries = fetch_page(client, page).await;
        last_page = page;
        page += 1;

        let Some(summaries) = summaries else {
            debug!("no candidates or fetch failed for this page, continuing");
            continue;
        };

        let mut candidate_ids: Vec<String> = Vec::new();
        for summary in summaries {
            match extract_candidate_id(&summary) {
                Some(id) => candidate_ids.push(id),
                // No usable id — keep the summary as an annotated row
                None => batch.push(placeholder_record(summary)),
            }
        }

        info!(
            candidates = candidate_ids.len(),
            workers, "fetching details concurrently"
        );
        let mut details = stream::iter(candidate_ids)
            .map(|id| async move { fetch_candidate_detail(client, &id).await })
            .buffer_unordered(workers);

        while let Some(record) = details.next().await {
            batch.push(record);
            if batch.len() >= target_records {
                break;
            }
        }
    }

    batch.truncate(target_records);
    info!(collected = batch.len(), "collected records in this run");

    BatchOutcome {
        records: batch,
        last_page,
    }
}

/// Extract a candidate identifier from a summary, trying the accepted key
/// names in priority order. String values must be non-blank; integer values
/// are rendered as strings; anything else falls through to the next key.
fn extract_candidate_id(summary: &CandidateSummary) -> Option<String> {
    ID_KEYS.iter().find_map(|key| match summary.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

fn placeholder_record(summary: CandidateSummary) -> CandidateRecord {
    let mut record = CandidateRecord::new();
    record.insert(
        SUMMARY_ERROR_FIELD.to_string(),
        Value::String("Valid ID not found in summary".to_string()),
    );
    record.extend(summary);
    record
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RetryConfig};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            base_url: server.uri(),
            api_token: "tok".into(),
            api_publisher: "pub".into(),
            call_delay: Duration::ZERO,
            retry: RetryConfig {
                max_attempts: 2,
                base_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(50),
                jitter: false,
            },
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    async fn mount_page(server: &MockServer, page: u32, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/candidates/{page}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_detail(server: &MockServer, id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/candidate/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn id_extraction_tries_keys_in_priority_order() {
        let summary = match json!({"candidate_id": "C", "id": "B", "Candidate Serial": "A"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(extract_candidate_id(&summary), Some("A".to_string()));
    }

    #[test]
    fn blank_ids_fall_through_to_the_next_key() {
        let summary = match json!({"Candidate Serial": "  ", "id": 42}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(extract_candidate_id(&summary), Some("42".to_string()));
    }

    #[test]
    fn floats_and_missing_keys_yield_no_id() {
        let summary = match json!({"Candidate Serial": 1.5, "name": "x"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(extract_candidate_id(&summary), None);
    }

    #[tokio::test]
    async fn collects_details_for_every_summary_on_a_page() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            1,
            json!([{"Candidate Serial": "A1"}, {"id": "B2"}]),
        )
        .await;
        mount_detail(&server, "A1", json!({"Candidate Serial": "A1", "Name": "Ada"})).await;
        mount_detail(&server, "B2", json!({"Candidate Serial": "B2", "Name": "Ben"})).await;

        let client = client_for(&server);
        let outcome = collect_until(&client, 2, 1, 1, 4).await;

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.last_page, 1);
        // Completion order is unspecified; check contents, not order
        let mut names: Vec<String> = outcome
            .records
            .iter()
            .map(|r| r.get("Name").unwrap().as_str().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Ada", "Ben"]);
    }

    #[tokio::test]
    async fn failed_pages_are_skipped_and_the_cursor_still_advances() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/candidates/1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount_page(&server, 2, json!([{"Candidate Serial": "A1"}])).await;
        mount_detail(&server, "A1", json!({"Candidate Serial": "A1"})).await;

        let client = client_for(&server);
        let outcome = collect_until(&client, 5, 1, 2, 2).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.last_page, 2, "cursor advanced past the failed page");
    }

    #[tokio::test]
    async fn summaries_without_ids_become_placeholder_records() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            1,
            json!([{"name": "No Id", "source": "import"}]),
        )
        .await;

        let client = client_for(&server);
        let outcome = collect_until(&client, 5, 1, 1, 2).await;

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(
            record.get(SUMMARY_ERROR_FIELD),
            Some(&json!("Valid ID not found in summary"))
        );
        // Original summary fields ride along
        assert_eq!(record.get("name"), Some(&json!("No Id")));
        assert_eq!(record.get("source"), Some(&json!("import")));
    }

    #[tokio::test]
    async fn overshoot_on_the_final_page_is_truncated_to_the_target() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            1,
            json!([
                {"Candidate Serial": "A"},
                {"Candidate Serial": "B"},
                {"Candidate Serial": "C"},
                {"Candidate Serial": "D"}
            ]),
        )
        .await;
        for id in ["A", "B", "C", "D"] {
            mount_detail(&server, id, json!({"Candidate Serial": id})).await;
        }

        let client = client_for(&server);
        let outcome = collect_until(&client, 2, 1, 1, 4).await;

        assert_eq!(outcome.records.len(), 2, "batch truncated to target");
    }

    #[tokio::test]
    async fn exhausted_pages_return_a_partial_batch() {
        let server = MockServer::start().await;
        mount_page(&server, 1, json!([{"Candidate Serial": "A"}])).await;
        mount_page(&server, 2, json!([])).await;
        mount_detail(&server, "A", json!({"Candidate Serial": "A"})).await;

        let client = client_for(&server);
        let outcome = collect_until(&client, 10, 1, 2, 2).await;

        assert_eq!(
            outcome.records.len(),
            1,
            "len(batch) == min(target, available candidates)"
        );
        assert_eq!(outcome.last_page, 2);
    }

    #[tokio::test]
    async fn empty_window_attempts_no_pages() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        // start_page beyond max_page: nothing attempted
        let outcome = collect_until(&client, 10, 5, 4, 2).await;
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.last_page, 4, "last_page stays at start_page - 1");
    }
}
