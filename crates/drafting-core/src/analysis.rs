//! Document analysis: detect the variables in an uploaded document

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{VariableSpec, VariableType};

use crate::error::AnalysisError;
use crate::oracle::{ResponseShape, TextGenerator};
use crate::prompts;

/// Variables and classification tags detected in a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub variables: Vec<VariableSpec>,
    pub similarity_tags: Vec<String>,
}

/// Collaborator that finds variables in raw document text
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Variable as the oracle returns it; every field may be missing or null
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawVariable {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    dtype: Option<VariableType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    variables: Option<Vec<RawVariable>>,
    #[serde(default)]
    similarity_tags: Option<Vec<String>>,
}

/// Apply defaults and keep the first declaration of each non-empty key
pub(crate) fn normalize_variables(raw: Vec<RawVariable>) -> Vec<VariableSpec> {
    let mut variables: Vec<VariableSpec> = Vec::with_capacity(raw.len());

    for item in raw {
        let key = item.key.unwrap_or_default().trim().to_string();
        if key.is_empty() || variables.iter().any(|v| v.key == key) {
            continue;
        }
        let spec = VariableSpec {
            label: item.label.unwrap_or_default(),
            description: item.description,
            example: item.example,
            required: item.required.unwrap_or(false),
            dtype: item.dtype.unwrap_or_default(),
            key,
        };
        variables.push(spec.normalized());
    }

    variables
}

pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Analyzer backed by the text-generation oracle
pub struct LlmDocumentAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl LlmDocumentAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl DocumentAnalyzer for LlmDocumentAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let prompt = prompts::analysis_prompt(text);
        let shape = ResponseShape::Schema(prompts::analysis_schema());
        let value = self.generator.generate(&prompt, &shape).await?;

        if !value.is_object() {
            return Err(AnalysisError::Malformed(format!(
                "expected a JSON object, got {}",
                value
            )));
        }
        let raw: RawAnalysis =
            serde_json::from_value(value).map_err(|e| AnalysisError::Malformed(e.to_string()))?;

        let result = AnalysisResult {
            variables: normalize_variables(raw.variables.unwrap_or_default()),
            similarity_tags: normalize_tags(raw.similarity_tags.unwrap_or_default()),
        };
        tracing::info!(
            "Analysis detected {} variables and {} tags",
            result.variables.len(),
            result.similarity_tags.len()
        );
        Ok(result)
    }
}
