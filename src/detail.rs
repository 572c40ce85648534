//! Per-candidate detail retrieval
//!
//! Every code path here returns a usable record. A candidate whose detail
//! cannot be fetched or decoded still produces a row carrying its identifier
//! and an error marker, so partial failures stay traceable in the export
//! instead of silently shrinking the batch.

use crate::client::ApiClient;
use crate::flatten::flatten_detail;
use crate::types::{CandidateRecord, DETAIL_ERROR_FIELD, ID_FIELD};
use serde_json::Value;
use tracing::warn;

/// Error marker written when all retries were exhausted
pub const FETCH_FAILED: &str = "Failed after max retries.";

/// Error marker written when the detail body could not be decoded
pub const DECODE_FAILED: &str = "JSON Decode Error";

/// Fetch and flatten one candidate's full detail record.
///
/// This is a total function: transport failure and malformed bodies both
/// degrade to a minimal placeholder record, never an error.
pub async fn fetch_candidate_detail(client: &ApiClient, candidate_id: &str) -> CandidateRecord {
    let url = client.detail_url(candidate_id);
    let Some(response) = client.get_with_retry(&url).await else {
        return error_record(candidate_id, FETCH_FAILED);
    };

    match response.json::<Value>().await {
        Ok(Value::Object(detail)) => flatten_detail(detail),
        Ok(other) => {
            warn!(candidate_id, body = %other, "detail body is not an object");
            error_record(candidate_id, DECODE_FAILED)
        }
        Err(e) => {
            warn!(candidate_id, error = %e, "failed to decode detail response");
            error_record(candidate_id, DECODE_FAILED)
        }
    }
}

fn error_record(candidate_id: &str, message: &str) -> CandidateRecord {
    let mut record = CandidateRecord::new();
    record.insert(ID_FIELD.to_string(), Value::String(candidate_id.to_string()));
    record.insert(
        DETAIL_ERROR_FIELD.to_string(),
        Value::String(message.to_string()),
    );
    record
}
