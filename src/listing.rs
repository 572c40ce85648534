//! Listing-endpoint access: page fetching and response-shape normalization
//!
//! The listing endpoint does not commit to one response shape. A page body
//! may be a bare array of summaries, or an object in which exactly one value
//! is the real summary array. [`normalize_listing`] evaluates a fixed ranked
//! set of extraction strategies and returns a typed result; the fetchers
//! collapse every failure mode into "no summaries" so page-level problems
//! never abort a run.

use crate::client::ApiClient;
use crate::types::CandidateSummary;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Normalized outcome of one listing response body
#[derive(Debug, PartialEq)]
pub enum Listing {
    /// Usable candidate summaries were extracted
    Summaries(Vec<CandidateSummary>),

    /// The body was valid but carried no summaries
    Empty,

    /// The body was an explicit error payload or an unusable shape
    Error(String),
}

/// Normalize a listing response body into a typed result.
///
/// Strategies in priority order:
/// 1. a bare array is the summary sequence itself;
/// 2. in an object, the longest non-empty array value is the sequence;
/// 3. an object with an `error` field and no usable sequence is an error;
/// 4. anything else is an unusable shape.
///
/// Array elements that are not objects cannot carry an identifier and are
/// dropped with a warning.
pub fn normalize_listing(body: Value) -> Listing {
    match body {
        Value::Array(items) => summaries_from(items),
        Value::Object(map) => {
            let mut best: Option<Vec<Value>> = None;
            for value in map.values() {
                if let Value::Array(list) = value
                    && list.len() > best.as_ref().map_or(0, Vec::len)
                {
                    best = Some(list.clone());
                }
            }
            match best {
                Some(list) => summaries_from(list),
                None => match map.get("error") {
                    Some(error) if is_meaningful(error) => Listing::Error(render(error)),
                    _ => Listing::Empty,
                },
            }
        }
        other => Listing::Error(format!("unexpected response shape: {other}")),
    }
}

fn summaries_from(items: Vec<Value>) -> Listing {
    let total = items.len();
    let summaries: Vec<CandidateSummary> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            other => {
                warn!(value = %other, "dropping non-object listing entry");
                None
            }
        })
        .collect();

    if summaries.is_empty() {
        if total > 0 {
            warn!(dropped = total, "listing contained no usable summaries");
        }
        Listing::Empty
    } else {
        Listing::Summaries(summaries)
    }
}

// An `error` field holding null, false or "" is not an error signal
fn is_meaningful(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
        && value.as_str().map_or(true, |s| !s.is_empty())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fetch one page of candidate summaries.
///
/// Returns `None` for every failure mode — no response, undecodable body,
/// explicit error payload, empty page — so the caller can treat all of them
/// as "no summaries, continue".
pub async fn fetch_page(client: &ApiClient, page: u32) -> Option<Vec<CandidateSummary>> {
    let response = client.get_with_retry(&client.listing_url(page)).await?;

    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            warn!(page, error = %e, "failed to decode listing response");
            return None;
        }
    };

    match normalize_listing(body) {
        Listing::Summaries(summaries) => Some(summaries),
        Listing::Empty => {
            debug!(page, "page returned no summaries");
            None
        }
        Listing::Error(message) => {
            warn!(page, error = %message, "API error on listing page");
            None
        }
    }
}

/// Resolve the total number of listing pages from the metadata endpoint.
///
/// The metadata body must carry integer-coercible `NumPages` and
/// `TotalCount` fields; any failure (no response, bad body, non-coercible
/// values) defaults the total to a single page.
pub async fn fetch_total_pages(client: &ApiClient) -> u32 {
    info!("resolving total page count from the metadata endpoint");

    let Some(response) = client.get_with_retry(&client.metadata_url()).await else {
        warn!("failed to get total pages after max retries, assuming 1 page");
        return 1;
    };

    let metadata: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to decode metadata response, assuming 1 page");
            return 1;
        }
    };

    let total_pages = coerce_integer(metadata.get("NumPages"));
    let total_count = coerce_integer(metadata.get("TotalCount"));
    match (total_pages, total_count) {
        (Some(pages), Some(count)) => {
            let pages = u32::try_from(pages).unwrap_or(u32::MAX);
            info!(total_candidates = count, total_pages = pages, "page count resolved");
            pages
        }
        _ => {
            warn!("no valid NumPages/TotalCount in metadata, assuming 1 page");
            1
        }
    }
}

// Accepts JSON integers, whole floats and numeric strings
fn coerce_integer(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
