//! Prompt builders for every oracle call the pipeline makes
//!
//! Each builder returns the full prompt text; response shapes live next to
//! them so a stage always pairs the instruction with its schema.

use serde_json::{json, Value};
use shared_types::VariableSpec;

use crate::search::Candidate;

pub const SELECTION_ROLE: &str = "You select the best legal document template for a request.";
pub const PREFILL_ROLE: &str = "You extract explicitly stated values from a user request.";
pub const QUESTION_ROLE: &str = "You are a legal drafting assistant writing intake questions.";
pub const NORMALIZE_ROLE: &str = "You are a legal template normalizer, not a writer or an advisor.";
pub const ANALYSIS_ROLE: &str = "You are a legal engineer turning raw legal text into a template.";

/// Selection arbitration over the ranked shortlist
pub fn selection_prompt(query: &str, candidates: &[Candidate], threshold: f64) -> String {
    let candidates_json =
        serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"{role}

User request:
"{query}"

Candidate templates:
{candidates_json}

Rules:
- Choose a template only if your confidence is at least {threshold}
- If none is suitable set best_template_id to null and say why in reason
- title is always required: the kind of legal document the user is asking for, inferred from the request
- Weigh title, tags and similarity score
- Return strict JSON only

Output format:
{{
  "best_template_id": number or null,
  "confidence": number,
  "reason": string,
  "title": string
}}"#,
        role = SELECTION_ROLE,
    )
}

pub fn selection_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "best_template_id": { "type": "INTEGER", "nullable": true },
            "confidence": { "type": "NUMBER", "nullable": true },
            "reason": { "type": "STRING" },
            "title": { "type": "STRING" }
        },
        "required": ["reason", "title"]
    })
}

/// Strict extraction of values stated in the query
pub fn prefill_prompt(query: &str, variables: &[VariableSpec]) -> String {
    let spec: Vec<Value> = variables
        .iter()
        .map(|v| json!({ "key": v.key, "label": v.display_label(), "dtype": v.dtype }))
        .collect();
    let spec_json = serde_json::to_string_pretty(&spec).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"{role}

User request:
"{query}"

Template variables:
{spec_json}

Rules:
- Only extract values clearly present in the user request
- Never guess or infer a value that is not written down
- Numbers must be plain digits with no thousands separators
- Omit every key whose value is not stated
- Return JSON only

Output example:
{{ "policy_number": "302786965" }}"#,
        role = PREFILL_ROLE,
    )
}

/// One friendly question per missing variable, batched
pub fn question_prompt(missing: &[VariableSpec]) -> String {
    let spec: Vec<Value> = missing
        .iter()
        .map(|v| {
            json!({
                "key": v.key,
                "label": v.display_label(),
                "description": v.description.as_deref().unwrap_or(""),
                "example": v.example.as_deref().unwrap_or(""),
                "dtype": v.dtype,
            })
        })
        .collect();
    let spec_json = serde_json::to_string_pretty(&spec).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"{role}

Write one clear, professional question for each variable below.

Rules:
- Do not restate the label or the variable name
- Use the description and example for helpful context
- Write for a real person filling in a legal form
- Add a format hint only when it helps
- Exactly one question per variable
- Output keys must match the variable keys exactly
- Return strict JSON only

Variables:
{spec_json}

Output:
{{ "<variable_key>": "<question>" }}"#,
        role = QUESTION_ROLE,
    )
}

/// Normalization of a web document into a generic template
pub fn normalize_prompt(title: &str, raw_text: &str, max_variables: usize) -> String {
    format!(
        r#"{role}

Convert the document below into a strictly generic, reusable legal template.

Document type:
{title}

The output must not:
- contain the words "sample", "example" or "specimen"
- contain square brackets
- contain real names, addresses, dates, currencies, identifiers or jurisdictions as fixed values
- assume a country, state or legal system

All variable data must:
- use double curly braces, for example {{{{party_a_name}}}}
- use snake_case keys only

Do not invent, improve or reorder clauses. Keep headings and numbering.
Always name the parties {{{{party_a_name}}}} and {{{{party_b_name}}}}.
Extract no more than {max_variables} variables, keeping only structurally essential ones.

Return only JSON in this schema:
{{
  "body": "full template text using double-curly-brace variables only",
  "variables": [
    {{ "key": "string", "label": "string", "description": "string", "example": "string", "required": true, "dtype": "string" }}
  ],
  "similarity_tags": ["string"]
}}

Raw source document:
{raw_text}"#,
        role = NORMALIZE_ROLE,
    )
}

pub fn normalize_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "body": { "type": "STRING" },
            "variables": { "type": "ARRAY", "items": variable_schema() },
            "similarity_tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["body", "variables"]
    })
}

/// Variable detection over an uploaded document
pub fn analysis_prompt(text: &str) -> String {
    format!(
        r#"{role}

Rules:
1. Identify the values that should become variables (party names, dates, amounts).
2. "key" is snake_case and consistent across similar legal documents.
3. "label" is human readable.
4. "description" explains the legal significance.
5. "example" is copied verbatim from the text.
6. "required" is true when the agreement is legally incomplete without the value.
7. "dtype" is one of: string, date, number, duration.
8. Do not invent information; use only what the text contains.

Text:
{text}

Respond only with JSON matching:
{{
  "variables": [
    {{ "key": "string", "label": "string", "description": "string", "example": "string", "required": true, "dtype": "string" }}
  ],
  "similarity_tags": ["string"]
}}"#,
        role = ANALYSIS_ROLE,
    )
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "variables": { "type": "ARRAY", "items": variable_schema() },
            "similarity_tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        }
    })
}

fn variable_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "key": { "type": "STRING" },
            "label": { "type": "STRING" },
            "description": { "type": "STRING" },
            "example": { "type": "STRING" },
            "required": { "type": "BOOLEAN" },
            "dtype": { "type": "STRING", "enum": ["string", "date", "number", "duration"] }
        },
        "required": ["key", "label"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{TemplateId, VariableType};

    #[test]
    fn test_selection_prompt_lists_candidates() {
        let candidates = vec![Candidate {
            id: TemplateId(4),
            title: "Mutual NDA".into(),
            tags: vec!["nda".into()],
            score: 0.912,
        }];
        let prompt = selection_prompt("I need an NDA", &candidates, 0.6);
        assert!(prompt.starts_with(SELECTION_ROLE));
        assert!(prompt.contains("\"I need an NDA\""));
        assert!(prompt.contains("Mutual NDA"));
        assert!(prompt.contains("0.912"));
        assert!(prompt.contains("at least 0.6"));
    }

    #[test]
    fn test_prefill_prompt_omits_examples() {
        let vars = vec![VariableSpec::new("amount", "Amount")
            .with_dtype(VariableType::Number)
            .with_example("SECRET-EXAMPLE")];
        let prompt = prefill_prompt("pay 500", &vars);
        assert!(prompt.contains("\"amount\""));
        assert!(prompt.contains("\"number\""));
        assert!(!prompt.contains("SECRET-EXAMPLE"));
    }

    #[test]
    fn test_normalize_prompt_renders_braces() {
        let prompt = normalize_prompt("Lease", "raw text", 6);
        assert!(prompt.contains("{{party_a_name}}"));
        assert!(prompt.contains("no more than 6 variables"));
        assert!(prompt.ends_with("raw text"));
    }
}
