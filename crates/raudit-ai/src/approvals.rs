//! Recent-approvals feed request and sanitization.

use raudit_core::{ApprovedIngredient, Region};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::backend::{BackendError, GenerateRequest, GenerateResponse};
use crate::config::ModelConfig;
use crate::normalize::{NOT_AVAILABLE, parse_lenient, text_field};

/// Number of approval events requested per refresh.
pub const APPROVALS_BATCH: usize = 6;

pub fn build_approvals_request(config: &ModelConfig) -> GenerateRequest {
    GenerateRequest {
        model: config.model.clone(),
        prompt: format!(
            "List {APPROVALS_BATCH} real ingredient approval events from 2025-2026 published by \
             regulators in China (NMPA, NHC, SAMR), the United States (FDA) or the European Union \
             (EC, EFSA). Each event must carry its specific announcement number or GRN number. \
             Use region CN, US or EU. Return a JSON array only."
        ),
        schema: approvals_schema(),
        grounding: config.enable_grounding,
    }
}

pub fn approvals_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "name": { "type": "STRING" },
                "cas": { "type": "STRING" },
                "date": { "type": "STRING" },
                "region": { "type": "STRING", "enum": ["CN", "US", "EU"] },
                "agency": { "type": "STRING" },
                "category": { "type": "STRING" },
                "regulatoryId": { "type": "STRING" },
                "url": { "type": "STRING" },
            },
            "required": ["id", "name", "date", "region", "agency", "category", "regulatoryId"],
        },
    })
}

/// Approvals from a backend call. Any failure yields an empty list.
pub fn approvals_from_outcome(
    outcome: Result<GenerateResponse, BackendError>,
) -> Vec<ApprovedIngredient> {
    match outcome {
        Ok(response) => parse_approvals(&response),
        Err(e) => {
            warn!(error = %e, "approvals refresh failed");
            Vec::new()
        }
    }
}

/// Extract at most [`APPROVALS_BATCH`] valid approvals from a response.
pub fn parse_approvals(response: &GenerateResponse) -> Vec<ApprovedIngredient> {
    let items = match read_array(response) {
        Some(items) => items,
        None => {
            warn!("approvals response carried no usable array");
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| sanitize_approval(item, i))
        .take(APPROVALS_BATCH)
        .collect()
}

/// Validate one approval record.
///
/// Records without a name or with a region outside CN/US/EU are dropped.
pub fn sanitize_approval(value: &Value, index: usize) -> Option<ApprovedIngredient> {
    let Some(obj) = value.as_object() else {
        warn!(index, "dropping non-object approval entry");
        return None;
    };
    let Some(name) = text_field(obj, &["name"]) else {
        warn!(index, "dropping approval without a name");
        return None;
    };
    let raw_region = text_field(obj, &["region"]).unwrap_or_default();
    let Some(region) = Region::parse(&raw_region) else {
        warn!(
            index,
            name = %name,
            region = %raw_region,
            "dropping approval with unsupported region"
        );
        return None;
    };

    let date = text_field(obj, &["date"]);
    let id = text_field(obj, &["id"]).unwrap_or_else(|| match &date {
        Some(date) => format!("ap_{}_{index}", date.replace('-', "_")),
        None => format!("ap_{index}"),
    });
    let date = date.unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let or_na = |keys: &[&str]| text_field(obj, keys).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Some(ApprovedIngredient {
        id,
        name,
        cas: optional(obj, "cas"),
        date,
        region,
        agency: or_na(&["agency"]),
        category: or_na(&["category"]),
        regulatory_id: or_na(&["regulatoryId", "regulatory_id"]),
        url: optional(obj, "url").filter(|u| u.starts_with("http://") || u.starts_with("https://")),
    })
}

fn optional(obj: &Map<String, Value>, key: &str) -> Option<String> {
    text_field(obj, &[key]).filter(|v| !v.eq_ignore_ascii_case(NOT_AVAILABLE))
}

fn read_array(response: &GenerateResponse) -> Option<Vec<Value>> {
    let value = match &response.payload {
        Some(v @ (Value::Array(_) | Value::Object(_))) => v.clone(),
        _ => parse_lenient(response.text.as_deref()?, '[', ']')?,
    };
    match value {
        Value::Array(items) => Some(items),
        // Some models wrap the list in an object.
        Value::Object(mut obj) => match obj.remove("approvals") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, region: &str) -> Value {
        json!({
            "id": id,
            "name": format!("ingredient {id}"),
            "cas": "N/A",
            "date": "2026-01-10",
            "region": region,
            "agency": "NMPA",
            "category": "Cosmetic new raw material",
            "regulatoryId": "国妆原备字20260002",
            "url": "https://hzpsys.nifdc.org.cn/"
        })
    }

    #[test]
    fn request_is_ungrounded_by_default() {
        let request = build_approvals_request(&ModelConfig::new("flash", false));
        assert!(!request.grounding);
        assert!(request.prompt.contains("6 real ingredient approval events"));
        assert_eq!(request.schema["type"], "ARRAY");
    }

    #[test]
    fn parses_array_payload() {
        let payload = json!([record("a", "CN"), record("b", "US")]);
        let approvals = parse_approvals(&GenerateResponse::from_payload(payload));
        assert_eq!(approvals.len(), 2);
        assert_eq!(approvals[0].region, Region::Cn);
        assert_eq!(approvals[1].region, Region::Us);
        assert!(approvals[0].cas.is_none());
        assert_eq!(approvals[0].url.as_deref(), Some("https://hzpsys.nifdc.org.cn/"));
    }

    #[test]
    fn parses_fenced_text() {
        let text = format!("```json\n{}\n```", json!([record("a", "EU")]));
        let approvals = parse_approvals(&GenerateResponse::from_text(text));
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].region, Region::Eu);
    }

    #[test]
    fn accepts_wrapped_list() {
        let payload = json!({ "approvals": [record("a", "CN")] });
        assert_eq!(parse_approvals(&GenerateResponse::from_payload(payload)).len(), 1);
    }

    #[test]
    fn caps_at_batch_size() {
        let payload: Vec<Value> = (0..9).map(|i| record(&i.to_string(), "US")).collect();
        let approvals = parse_approvals(&GenerateResponse::from_payload(Value::Array(payload)));
        assert_eq!(approvals.len(), APPROVALS_BATCH);
        assert_eq!(approvals[0].id, "0");
    }

    #[test]
    fn drops_invalid_records() {
        let payload = json!([
            record("ok", "EU"),
            record("jp", "JP"),
            { "region": "CN", "date": "2026-01-01" },
            "not an object"
        ]);
        let approvals = parse_approvals(&GenerateResponse::from_payload(payload));
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals[0].id, "ok");
    }

    #[test]
    fn fills_missing_fields() {
        let payload = json!([{ "name": "Psicose", "region": "China", "date": "2025-07-15", "url": "n/a" }]);
        let approvals = parse_approvals(&GenerateResponse::from_payload(payload));
        let a = &approvals[0];
        assert_eq!(a.id, "ap_2025_07_15_0");
        assert_eq!(a.region, Region::Cn);
        assert_eq!(a.agency, NOT_AVAILABLE);
        assert_eq!(a.regulatory_id, NOT_AVAILABLE);
        assert!(a.url.is_none());
    }

    #[test]
    fn undated_record_gets_index_id() {
        let payload = json!([
            { "name": "Psicose", "region": "CN", "date": "2025-07-15" },
            { "name": "Bakuchiol", "region": "EU" }
        ]);
        let approvals = parse_approvals(&GenerateResponse::from_payload(payload));
        assert_eq!(approvals[1].id, "ap_1");
        assert_eq!(approvals[1].date, NOT_AVAILABLE);
    }

    #[test]
    fn garbage_yields_empty() {
        assert!(parse_approvals(&GenerateResponse::from_text("no approvals today")).is_empty());
        assert!(parse_approvals(&GenerateResponse::default()).is_empty());
        assert!(parse_approvals(&GenerateResponse::from_payload(json!("x"))).is_empty());
    }

    #[test]
    fn failure_yields_empty() {
        let outcome = Err(BackendError::from_status(429, "slow down".into()));
        assert!(approvals_from_outcome(outcome).is_empty());
    }
}
