//! Elicit one friendly question per still-missing variable

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use shared_types::VariableSpec;

use crate::oracle::{self, ResponseShape, TextGenerator};
use crate::prompts;

/// Variable key to question text
pub type Questions = BTreeMap<String, String>;

/// Batched question generator.
///
/// Every missing key receives a question: keys the oracle skipped (or a
/// failed oracle call) get a deterministic question built from the spec.
pub struct QuestionGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl QuestionGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn questions(&self, missing: &[VariableSpec]) -> Questions {
        if missing.is_empty() {
            return Questions::new();
        }

        let prompt = prompts::question_prompt(missing);
        let reply: Map<String, Value> =
            oracle::ask(self.generator.as_ref(), &prompt, &ResponseShape::JsonObject)
                .await
                .unwrap_or_log("questions", Map::new());

        let mut questions = Questions::new();
        let mut fallbacks = 0;
        for var in missing {
            let generated = reply
                .get(&var.key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|q| !q.is_empty());
            let question = match generated {
                Some(q) => q.to_string(),
                None => {
                    fallbacks += 1;
                    fallback_question(var)
                }
            };
            questions.insert(var.key.clone(), question);
        }

        if fallbacks > 0 {
            tracing::warn!("{} of {} questions used the fallback wording", fallbacks, missing.len());
        }
        tracing::info!("Generated {} questions", questions.len());
        questions
    }
}

/// Question composed from label, description and format hint
pub fn fallback_question(var: &VariableSpec) -> String {
    let mut question = format!("Please provide the {}.", var.display_label());
    if let Some(description) = var.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        question.push(' ');
        question.push_str(description);
        if !description.ends_with(['.', '?', '!']) {
            question.push('.');
        }
    }
    if let Some(hint) = var.dtype.format_hint() {
        question.push_str(&format!(" (Format: {})", hint));
    }
    question
}
