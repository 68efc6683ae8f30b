//! Validation of raw classifier output.
//!
//! # Invariants
//! - Output is either a well-formed `ClassificationResult` or
//!   `ClassificationError::Malformed`.
//! - `task`/`idea` results always carry a non-blank summary.
//! - `accept`/`null` results carry no topic, summary or due date.

use super::ClassificationError;
use crate::model::classification::{Category, ClassificationResult};
use chrono::NaiveDate;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static FENCED_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex"));

/// Loosely-typed reply as the service sends it. Unknown keys (such as a
/// suggested assignee) are ignored.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

/// Parses and validates one raw reply.
pub fn parse_classification(raw: &str) -> Result<ClassificationResult, ClassificationError> {
    let json = extract_json(raw);
    let parsed: RawClassification = serde_json::from_str(json)
        .map_err(|err| ClassificationError::Malformed(format!("not a classification object: {err}")))?;

    let category = parse_category(parsed.category.as_deref())?;
    match category {
        Category::Accept | Category::Null => Ok(ClassificationResult {
            category,
            topic: None,
            summary: None,
            due_date: None,
        }),
        Category::Task | Category::Idea => {
            let summary = non_blank(parsed.summary).ok_or_else(|| {
                ClassificationError::Malformed(format!(
                    "category `{}` requires a summary",
                    category.as_str()
                ))
            })?;
            Ok(ClassificationResult {
                category,
                topic: non_blank(parsed.topic),
                summary: Some(summary),
                due_date: parse_due_date(parsed.due_date.as_deref()),
            })
        }
    }
}

/// Strips a markdown code fence when the service wrapped its JSON in one.
fn extract_json(raw: &str) -> &str {
    match FENCED_JSON_RE.captures(raw).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

fn parse_category(value: Option<&str>) -> Result<Category, ClassificationError> {
    let Some(value) = value else {
        return Ok(Category::Null);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "null" | "none" => Ok(Category::Null),
        "task" => Ok(Category::Task),
        "idea" => Ok(Category::Idea),
        "accept" => Ok(Category::Accept),
        other => Err(ClassificationError::Malformed(format!(
            "unknown category `{other}`"
        ))),
    }
}

/// A bad due date loses the date, not the task.
fn parse_due_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            warn!(
                "event=classify_due_date module=classify status=skip value={} error={}",
                value, err
            );
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
