//! Flattening of nested candidate-detail payloads into flat records
//!
//! A candidate detail arrives with three nested sub-structures —
//! `Questionnaires`, `Job Submissions` and `Application History` — that
//! downstream consumers need inlined as flat, stably named columns. This
//! module is a pure transform: no I/O, no retries, fully deterministic.
//!
//! Field-name collisions (a question text repeating across questionnaires,
//! or matching an existing top-level field) silently overwrite, last write
//! wins. That mirrors the upstream system and is covered by tests; it is not
//! to be "fixed" without product sign-off.

use crate::types::CandidateRecord;
use serde_json::Value;

const QUESTIONNAIRES_KEY: &str = "Questionnaires";
const HISTORY_KEYS: [&str; 2] = ["Job Submissions", "Application History"];
const NO_RECORDS: &str = "No records found";

/// Flatten one nested candidate detail into a flat record.
///
/// Questionnaires and both history sequences are removed and replaced by
/// derived fields; every other top-level field passes through unchanged in
/// its original position. Re-applying the transform to its own output is a
/// no-op.
pub fn flatten_detail(detail: CandidateRecord) -> CandidateRecord {
    let mut flat = flatten_questionnaires(detail);
    for key in HISTORY_KEYS {
        flat = flatten_history(flat, key);
    }
    flat
}

/// Inline the `Questionnaires` sequence.
///
/// For entry *i* (1-based) named `<name>` (default `Questionnaire_<i>`):
/// emits `<name> - Serial` and `<name> - Submit Date`, plus one field per
/// question/value pair keyed by the question text itself.
fn flatten_questionnaires(mut detail: CandidateRecord) -> CandidateRecord {
    let questionnaires = match detail.remove(QUESTIONNAIRES_KEY) {
        Some(Value::Array(list)) if !list.is_empty() => list,
        _ => return detail,
    };

    for (i, questionnaire) in questionnaires.iter().enumerate() {
        let Some(questionnaire) = questionnaire.as_object() else {
            continue;
        };

        let name = questionnaire
            .get("Questionnaire Name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Questionnaire_{}", i + 1));

        detail.insert(
            format!("{name} - Serial"),
            questionnaire
                .get("Questionnaire Serial")
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
        );
        detail.insert(
            format!("{name} - Submit Date"),
            questionnaire.get("Submit Date").cloned().unwrap_or(Value::Null),
        );

        let Some(questions) = questionnaire.get("Questions").and_then(Value::as_array) else {
            continue;
        };
        for item in questions {
            let Some(item) = item.as_object() else {
                continue;
            };
            let question = item.get("Question").and_then(Value::as_str).unwrap_or("");
            let value = item.get("Value");
            if let Some(value) = value
                && !question.is_empty()
                && !value.is_null()
            {
                detail.insert(question.to_string(), value.clone());
            }
        }
    }

    detail
}

/// Reduce one nested history sequence to a summary string and a count.
///
/// Every entry becomes `[<job> | <date> | <status>]` with a per-slot
/// fallback chain; entries join with ` || ` into `<key> Summary`, and
/// `<key> Count` carries the entry count. An absent or empty sequence yields
/// `<key> Summary = "No records found"` and no count field — unless a
/// summary field already exists, which keeps the transform idempotent.
fn flatten_history(mut detail: CandidateRecord, key: &str) -> CandidateRecord {
    let summary_key = format!("{key} Summary");

    let history = match detail.remove(key) {
        Some(Value::Array(list)) if !list.is_empty() => list,
        _ => {
            if !detail.contains_key(&summary_key) {
                detail.insert(summary_key, Value::String(NO_RECORDS.into()));
            }
            return detail;
        }
    };

    let parts: Vec<String> = history
        .iter()
        .map(|item| {
            let job = pick(item, ["Job Name", "Job Title"]);
            let date = pick(item, ["Date", "Create Date"]);
            let status = pick(item, ["Status", "Stage"]);
            format!("[{job} | {date} | {status}]")
        })
        .collect();

    detail.insert(summary_key, Value::String(parts.join(" || ")));
    detail.insert(format!("{key} Count"), Value::from(history.len() as u64));
    detail
}

// First usable value among the candidate field names, else "N/A".
// Null and empty-string values fall through to the next name.
fn pick(item: &Value, names: [&str; 2]) -> String {
    let Some(item) = item.as_object() else {
        return "N/A".to_string();
    };
    names
        .iter()
        .filter_map(|name| item.get(*name))
        .find(|value| !value.is_null() && value.as_str().map_or(true, |s| !s.is_empty()))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "N/A".to_string())
}
