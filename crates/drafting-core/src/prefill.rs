//! Extract explicitly stated variable values from the user query

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use shared_types::{VariableSpec, VariableType};

use crate::oracle::{self, ResponseShape, TextGenerator};
use crate::prompts;
use crate::render::Answers;

lazy_static! {
    static ref GROUPED_NUMBER: Regex = Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$").unwrap();
}

/// Oracle-backed prefiller; failures yield an empty mapping
pub struct VariablePrefiller {
    generator: Arc<dyn TextGenerator>,
}

impl VariablePrefiller {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Values for declared keys that the query states outright
    pub async fn prefill(&self, query: &str, variables: &[VariableSpec]) -> Answers {
        if variables.is_empty() {
            return Answers::new();
        }

        let prompt = prompts::prefill_prompt(query, variables);
        let reply: Map<String, Value> =
            oracle::ask(self.generator.as_ref(), &prompt, &ResponseShape::JsonObject)
                .await
                .unwrap_or_log("prefill", Map::new());

        let prefilled = extract_declared(&reply, variables);
        tracing::info!(
            "Prefilled {} of {} variables",
            prefilled.len(),
            variables.len()
        );
        prefilled
    }
}

/// Keep only declared keys with usable scalar values
fn extract_declared(reply: &Map<String, Value>, variables: &[VariableSpec]) -> Answers {
    let mut out = Answers::new();
    for var in variables {
        let Some(value) = reply.get(&var.key).and_then(scalar_text) else {
            continue;
        };
        let value = match var.dtype {
            VariableType::Number if GROUPED_NUMBER.is_match(&value) => value.replace(',', ""),
            _ => value,
        };
        out.insert(var.key.clone(), value);
    }
    out
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}
