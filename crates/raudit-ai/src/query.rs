//! Audit prompt and response schema for a single ingredient.

use raudit_core::IngredientQuery;
use raudit_core::reference::MANDATORY_SITES;
use serde_json::{Map, Value, json};

use crate::backend::GenerateRequest;
use crate::config::ModelConfig;

/// Per-record fields the backend must return, with the meaning given to the model.
///
/// Drives both the prompt text and the response schema so the two cannot drift.
pub const DETAIL_FIELDS: &[(&str, &str)] = &[
    ("region", "Jurisdiction code of the filing, e.g. CN, US, EU"),
    (
        "status",
        "One of Passed, Restricted, Prohibited, Unknown for this filing",
    ),
    (
        "regulatoryId",
        "Identifier exactly as published, e.g. GRN number or filing number",
    ),
    ("approvalDate", "Date the filing was approved or published"),
    ("applicant", "Company or body that submitted the filing"),
    (
        "dosageForm",
        "Permitted product form or category of use",
    ),
    (
        "materialSource",
        "Origin or manufacturing process of the material",
    ),
    ("limit", "Usage limit or maximum level, if any"),
    (
        "notes",
        "Audit notes, including how the record was checked against the source document",
    ),
    ("sources", "URLs of the official pages or PDFs the record came from"),
];

const STATUS_VALUES: &[&str] = &["Passed", "Restricted", "Prohibited", "Unknown"];

/// Build the grounded audit request for one ingredient.
pub fn build_audit_request(query: &IngredientQuery, config: &ModelConfig) -> GenerateRequest {
    GenerateRequest {
        model: config.model.clone(),
        prompt: audit_prompt(query),
        schema: audit_schema(),
        grounding: config.enable_grounding,
    }
}

fn audit_prompt(query: &IngredientQuery) -> String {
    let sites = MANDATORY_SITES.join(", ");
    let fields: String = DETAIL_FIELDS
        .iter()
        .map(|(name, meaning)| format!("- {name}: {meaning}\n"))
        .collect();

    format!(
        "Task: run a global regulatory compliance audit for the ingredient \"{query}\".\n\
         \n\
         Search scope:\n\
         1. Only use information published under these official domains: {sites}.\n\
         2. Search each domain with site: queries for GRAS notices (GRN), new raw material \
         filings, and new food raw material approvals covering this ingredient.\n\
         3. Prefer figures taken from official PDF documents or published tables.\n\
         \n\
         Identifier rules:\n\
         - Never invent a GRN number, filing number or any other regulatory identifier. \
         Every regulatoryId must be copied from a page or PDF you actually retrieved.\n\
         - If no identifier can be found for a record, write N/A instead of guessing.\n\
         - When the ingredient has several independent filings, for example different \
         applicants under different GRN numbers, list every filing as its own record. \
         Never merge them.\n\
         - Check applicant, regulatoryId, approvalDate and the process description against \
         the official publication.\n\
         \n\
         Every record in \"details\" must carry these fields:\n\
         {fields}\
         \n\
         Output: JSON only, matching the response schema. Include every independent record \
         found. Put an overall assessment in \"summary\" and the CAS number in \"cas\" when known."
    )
}

/// Response schema in the provider's OpenAPI-subset form.
pub fn audit_schema() -> Value {
    let mut properties = Map::new();
    for (name, meaning) in DETAIL_FIELDS {
        let property = match *name {
            "sources" => json!({
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": meaning,
            }),
            "status" => json!({
                "type": "STRING",
                "enum": STATUS_VALUES,
                "description": meaning,
            }),
            _ => json!({ "type": "STRING", "description": meaning }),
        };
        properties.insert((*name).to_string(), property);
    }
    let required: Vec<&str> = DETAIL_FIELDS.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "cas": { "type": "STRING" },
            "summary": {
                "type": "STRING",
                "description": "Overall assessment based on the official sources",
            },
            "details": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                },
            },
            "groundingSources": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "uri": { "type": "STRING" },
                    },
                    "required": ["uri"],
                },
            },
        },
        "required": ["name", "summary", "details"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_for(name: &str) -> GenerateRequest {
        let query = IngredientQuery::parse(name).unwrap();
        build_audit_request(&query, &ModelConfig::new("test-model", true))
    }

    #[test]
    fn prompt_names_the_ingredient() {
        let request = request_for("  L-Ergothioneine ");
        assert!(request.prompt.contains("\"L-Ergothioneine\""));
    }

    #[test]
    fn prompt_lists_every_mandatory_site() {
        let request = request_for("psicose");
        for site in MANDATORY_SITES {
            assert!(request.prompt.contains(site), "missing {site}");
        }
    }

    #[test]
    fn prompt_forbids_invented_ids_and_merging() {
        let request = request_for("psicose");
        assert!(request.prompt.contains("Never invent"));
        assert!(request.prompt.contains("Never merge"));
    }

    #[test]
    fn prompt_describes_every_field() {
        let request = request_for("psicose");
        for (name, meaning) in DETAIL_FIELDS {
            assert!(request.prompt.contains(&format!("- {name}: {meaning}")));
        }
    }

    #[test]
    fn request_carries_model_config() {
        let query = IngredientQuery::parse("psicose").unwrap();
        let request = build_audit_request(&query, &ModelConfig::new("m-1", false));
        assert_eq!(request.model, "m-1");
        assert!(!request.grounding);
    }

    #[test]
    fn schema_requires_all_ten_detail_fields() {
        let schema = audit_schema();
        let required = schema["properties"]["details"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 10);
        assert!(required.contains(&json!("regulatoryId")));
        assert!(required.contains(&json!("sources")));
        assert_eq!(
            schema["properties"]["details"]["items"]["properties"]["sources"]["type"],
            "ARRAY"
        );
        assert_eq!(schema["required"], json!(["name", "summary", "details"]));
    }

    #[test]
    fn schema_constrains_status_values() {
        let schema = audit_schema();
        let status = &schema["properties"]["details"]["items"]["properties"]["status"];
        assert_eq!(status["enum"], json!(STATUS_VALUES));
    }
}
