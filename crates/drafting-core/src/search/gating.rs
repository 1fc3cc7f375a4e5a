//! Confidence gating for template reuse
//!
//! The selector asks the text-generation oracle to arbitrate among the ranked
//! shortlist, then applies the confidence threshold:
//! - A chosen id from the shortlist with confidence >= threshold: reuse
//! - Anything else: fall back to web acquisition, seeded by the inferred title
//!
//! Oracle failures never escape this module; they degrade to a result with
//! no id and an empty title.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use shared_types::TemplateId;

use super::Candidate;
use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::oracle::{self, OracleReply, ResponseShape, TextGenerator};
use crate::prompts;

/// Reason recorded when the oracle could not be used
pub const SELECTION_FAILED_REASON: &str = "selection failed";

/// Structured arbitration result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    #[serde(default)]
    pub best_template_id: Option<TemplateId>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reason: String,
    /// Inferred document type, seeds the web search on fallback
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
}

impl SelectionResult {
    /// Degraded result used when the oracle is unusable
    pub fn failed() -> Self {
        Self {
            best_template_id: None,
            confidence: None,
            reason: SELECTION_FAILED_REASON.to_string(),
            title: String::new(),
        }
    }

    /// True when the result names a template with confidence at or above `threshold`
    pub fn is_reusable(&self, threshold: f64) -> bool {
        self.best_template_id.is_some() && self.confidence.is_some_and(|c| c >= threshold)
    }
}

/// What the pipeline does next
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionDecision {
    Reuse {
        template_id: TemplateId,
        confidence: f64,
        reason: String,
    },
    Fallback {
        /// Trimmed inferred title; empty means there is nothing to search for
        title: String,
        reason: String,
    },
}

/// Oracle-arbitrated template selector
pub struct TemplateSelector {
    generator: Arc<dyn TextGenerator>,
    threshold: f64,
}

impl TemplateSelector {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Ask the oracle to choose among `candidates`
    pub async fn select(&self, query: &str, candidates: &[Candidate]) -> SelectionResult {
        let prompt = prompts::selection_prompt(query, candidates, self.threshold);
        let shape = ResponseShape::Schema(prompts::selection_schema());

        match oracle::ask::<SelectionResult>(self.generator.as_ref(), &prompt, &shape).await {
            OracleReply::Success(result) => {
                tracing::info!(
                    "Selector chose {:?} (confidence {:?}, title '{}')",
                    result.best_template_id,
                    result.confidence,
                    result.title
                );
                result
            }
            OracleReply::Failure(reason) => {
                tracing::warn!("Template selection degraded: {}", reason);
                SelectionResult::failed()
            }
        }
    }

    /// Apply the threshold and shortlist membership to a selection result
    pub fn decide(&self, result: &SelectionResult, candidates: &[Candidate]) -> SelectionDecision {
        if let (true, Some(id), Some(confidence)) = (
            result.is_reusable(self.threshold),
            result.best_template_id,
            result.confidence,
        ) {
            if candidates.iter().any(|c| c.id == id) {
                return SelectionDecision::Reuse {
                    template_id: id,
                    confidence,
                    reason: result.reason.clone(),
                };
            }
            tracing::warn!("Selector chose template {} outside the shortlist", id);
        }

        SelectionDecision::Fallback {
            title: result.title.trim().to_string(),
            reason: result.reason.clone(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
