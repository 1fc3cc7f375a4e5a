//! Deterministic rendering of `{{key}}` placeholders
//!
//! Substitution is a single left-to-right scan: each `{{key}}` token with a
//! value is replaced verbatim, inserted values are never rescanned, and
//! tokens without a value are copied through untouched.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared_types::{Template, TemplateId, VariableSpec};

use crate::error::DraftingError;

lazy_static! {
    /// A placeholder token; the key is anything between the braces
    pub(crate) static ref PLACEHOLDER_PATTERN: Regex = Regex::new(r"\{\{([^{}]+)\}\}").unwrap();
}

/// Final variable values keyed by variable key
pub type Answers = BTreeMap<String, String>;

/// Output of a successful render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub template_id: TemplateId,
    pub output_text: String,
    pub filled_variables: Answers,
}

/// Replace every `{{key}}` whose key has a value; leave the rest as-is
pub fn substitute(body: &str, values: &Answers) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };

        match values.get(&after[..close]) {
            Some(value) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Distinct placeholder keys in order of first appearance
pub fn placeholders(body: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for cap in PLACEHOLDER_PATTERN.captures_iter(body) {
        let key = &cap[1];
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Merge prefilled values with user answers; answers win on collision
pub fn merge_answers(prefilled: &Answers, answers: &Answers) -> Answers {
    let mut merged = prefilled.clone();
    for (key, value) in answers {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// First required variable (declaration order) without a value
pub fn first_missing_required<'a>(
    variables: &'a [VariableSpec],
    values: &Answers,
) -> Option<&'a VariableSpec> {
    variables
        .iter()
        .find(|v| v.required && !values.contains_key(&v.key))
}

/// Validate required fields and render the template body.
///
/// All-or-nothing: a missing required field returns an error and no text.
pub fn render_template(
    template: &Template,
    answers: &Answers,
    prefilled: &Answers,
) -> Result<RenderedDocument, DraftingError> {
    let merged = merge_answers(prefilled, answers);

    if let Some(missing) = first_missing_required(&template.variables, &merged) {
        return Err(DraftingError::ValidationFailure {
            key: missing.key.clone(),
            label: missing.display_label().to_string(),
        });
    }

    let output_text = substitute(&template.body, &merged);
    tracing::info!(
        "Rendered template {} with {} values",
        template.id,
        merged.len()
    );

    Ok(RenderedDocument {
        template_id: template.id,
        output_text,
        filled_variables: merged,
    })
}
