//! Response normalization: turns whatever the backend returned into a fully
//! populated [`IngredientResult`].
//!
//! Every response, good or bad, passes through [`normalize_outcome`]. The
//! functions here never fail; missing or malformed data degrades to defaults.
//!
//! # Default table
//!
//! | field | default |
//! |---|---|
//! | `region` | `"Unknown"` |
//! | `status` | `Unknown` |
//! | `regulatoryId`, `approvalDate`, `applicant`, `dosageForm`, `materialSource`, `limit`, `notes` | `"N/A"` |
//! | `sources` | `[]` |

use std::collections::HashMap;

use raudit_core::{ComplianceStatus, GroundingLink, IngredientResult, RegionDetail};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::backend::{BackendError, GenerateResponse};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Summary used when the backend produced nothing usable.
pub const NO_DATA_SUMMARY: &str = "No compliance data could be retrieved for this ingredient.";
/// Summary used when records came back without an overall assessment.
pub const MISSING_SUMMARY: &str = "No overall assessment was provided; see the regional records.";

/// Normalize the outcome of a backend call.
///
/// Transport and decoding failures become an empty result whose summary
/// explains what went wrong.
pub fn normalize_outcome(
    outcome: Result<GenerateResponse, BackendError>,
    fallback_name: &str,
) -> IngredientResult {
    match outcome {
        Ok(response) => normalize(&response, fallback_name),
        Err(e) => {
            warn!(ingredient = %fallback_name, error = %e, "audit request failed");
            IngredientResult::empty(fallback_name, e.kind().summary())
        }
    }
}

/// Normalize a successful backend response.
pub fn normalize(response: &GenerateResponse, fallback_name: &str) -> IngredientResult {
    let Some(obj) = read_object(response) else {
        warn!(ingredient = %fallback_name, "backend response carried no usable payload");
        return IngredientResult::empty(fallback_name, NO_DATA_SUMMARY);
    };

    let details: Vec<RegionDetail> = match obj.get("details") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => Some(sanitize_detail(item)),
                other => {
                    debug!(item = %other, "skipping non-object detail entry");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let name = text_field(&obj, &["name"]).unwrap_or_else(|| fallback_name.to_string());
    let summary = text_field(&obj, &["summary"]).unwrap_or_else(|| {
        if details.is_empty() {
            NO_DATA_SUMMARY.to_string()
        } else {
            MISSING_SUMMARY.to_string()
        }
    });

    let embedded: Vec<GroundingLink> = match obj.get("groundingSources") {
        Some(Value::Array(items)) => items.iter().filter_map(link_from_value).collect(),
        _ => Vec::new(),
    };
    let grounding_sources =
        merge_grounding_links(embedded.into_iter().chain(response.citations.iter().cloned()));

    IngredientResult {
        name,
        cas: text_field(&obj, &["cas", "casNumber"]),
        summary,
        details,
        grounding_sources,
    }
}

/// Fill every field of one regional record, defaulting whatever is missing.
///
/// Applying this to a record that was already sanitized returns it unchanged.
pub fn sanitize_detail(value: &Value) -> RegionDetail {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);
    let or_na = |keys: &[&str]| text_field(obj, keys).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    RegionDetail {
        region: text_field(obj, &["region"]).unwrap_or_else(|| UNKNOWN.to_string()),
        status: text_field(obj, &["status"])
            .map(|s| ComplianceStatus::from_label(&s))
            .unwrap_or_default(),
        regulatory_id: or_na(&["regulatoryId", "regulatory_id"]),
        approval_date: or_na(&["approvalDate", "approval_date"]),
        applicant: or_na(&["applicant"]),
        dosage_form: or_na(&["dosageForm", "dosage_form"]),
        material_source: or_na(&["materialSource", "material_source"]),
        usage_limit: or_na(&["limit", "usageLimit", "usage_limit"]),
        notes: or_na(&["notes"]),
        sources: string_list(obj.get("sources")),
    }
}

/// Merge citations, keeping one link per URI.
///
/// A repeated URI keeps its first position and takes the later title.
pub fn merge_grounding_links(links: impl IntoIterator<Item = GroundingLink>) -> Vec<GroundingLink> {
    let mut merged: Vec<GroundingLink> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for link in links {
        let uri = link.uri.trim();
        if uri.is_empty() {
            continue;
        }
        let title = match link.title.trim() {
            "" => uri.to_string(),
            t => t.to_string(),
        };
        match index.get(uri).copied() {
            Some(i) => merged[i].title = title,
            None => {
                index.insert(uri.to_string(), merged.len());
                merged.push(GroundingLink {
                    title,
                    uri: uri.to_string(),
                });
            }
        }
    }
    merged
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse JSON out of model text: fenced, plain, or embedded in prose.
///
/// `open`/`close` delimit the outermost value to look for when the text has
/// commentary around it.
pub(crate) fn parse_lenient(text: &str, open: char, close: char) -> Option<Value> {
    let stripped = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str(stripped) {
        return Some(value);
    }
    let start = stripped.find(open)?;
    let end = stripped.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&stripped[start..=end]).ok()
}

/// First non-blank scalar under any of `keys`, as a trimmed string.
pub(crate) fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn read_object(response: &GenerateResponse) -> Option<Map<String, Value>> {
    if let Some(Value::Object(obj)) = &response.payload {
        return Some(obj.clone());
    }
    let text = response.text.as_deref()?;
    match parse_lenient(text, '{', '}') {
        Some(Value::Object(obj)) => Some(obj),
        _ => {
            warn!(len = text.len(), "could not parse backend text as an audit object");
            None
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v @ Value::String(_)) => vec![v],
        _ => Vec::new(),
    };

    let mut out: Vec<String> = Vec::new();
    for item in items {
        let s = match item {
            Value::String(s) => s.trim(),
            Value::Object(obj) => match obj.get("uri").or_else(|| obj.get("url")) {
                Some(Value::String(s)) => s.trim(),
                _ => continue,
            },
            _ => continue,
        };
        if !s.is_empty() && !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}

fn link_from_value(value: &Value) -> Option<GroundingLink> {
    let obj = value.as_object()?;
    let uri = text_field(obj, &["uri", "url"])?;
    let title = text_field(obj, &["title"]).unwrap_or_else(|| uri.clone());
    Some(GroundingLink { title, uri })
}
