//! Fallback template acquisition
//!
//! When no stored template qualifies, search the web for an example of the
//! inferred document type, have the oracle normalize it into a generic
//! template and persist the result.

use std::sync::Arc;

use serde::Deserialize;
use shared_types::{NewTemplate, Template};

use crate::analysis::{normalize_tags, normalize_variables, RawVariable};
use crate::config::PipelineConfig;
use crate::embeddings::{embed_new_template, Embedder};
use crate::error::DraftingError;
use crate::ingest::parametrize_body;
use crate::oracle::{self, OracleReply, ResponseShape, TextGenerator};
use crate::prompts;
use crate::search::{safe_truncate, WebSearch};
use crate::storage::TemplateStore;
use crate::verifier::TemplateVerifier;

/// Normalizer output before defaults are applied
#[derive(Debug, Deserialize)]
struct NormalizedDocument {
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    variables: Option<Vec<RawVariable>>,
    #[serde(default)]
    similarity_tags: Option<Vec<String>>,
}

/// Synthesizes and stores a new template from a web search result
pub struct TemplateAcquirer {
    generator: Arc<dyn TextGenerator>,
    search: Arc<dyn WebSearch>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn TemplateStore>,
    verifier: TemplateVerifier,
    config: PipelineConfig,
}

impl TemplateAcquirer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn TemplateStore>,
    ) -> Self {
        Self {
            generator,
            search,
            embedder,
            store,
            verifier: TemplateVerifier::default(),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Search, normalize and persist a template titled `title`
    pub async fn acquire(&self, title: &str) -> Result<Template, DraftingError> {
        let title = title.trim();
        let query = self.config.search_query(title);
        tracing::info!("Fallback: searching the web for '{}'", query);

        let document = self
            .search
            .search(&query)
            .await?
            .filter(|doc| !doc.text.trim().is_empty())
            .ok_or_else(|| DraftingError::NoWebResult(title.to_string()))?;

        let text = safe_truncate(&document.text, self.config.web_text_cap);
        tracing::debug!(
            "Web result '{}' truncated from {} to {} chars",
            document.title,
            document.text.chars().count(),
            text.chars().count()
        );

        let template = self.normalize(title, text).await?;
        let template = embed_new_template(self.embedder.as_ref(), template).await?;
        self.verifier.verify_and_log(&template);

        let id = self.store.create(template.clone()).await?;
        tracing::info!(
            "Synthesized template {} '{}' with {} variables",
            id,
            template.title,
            template.variables.len()
        );
        Ok(template.into_template(id))
    }

    /// Ask the oracle for a generic template and clean up its output
    async fn normalize(&self, title: &str, text: &str) -> Result<NewTemplate, DraftingError> {
        let prompt = prompts::normalize_prompt(title, text, self.config.max_web_variables);
        let shape = ResponseShape::Schema(prompts::normalize_schema());

        let normalized: NormalizedDocument =
            match oracle::ask(self.generator.as_ref(), &prompt, &shape).await {
                OracleReply::Success(doc) => doc,
                OracleReply::Failure(reason) => {
                    return Err(DraftingError::WebExtractionFailure(reason));
                }
            };

        let body = strip_brackets(normalized.body.as_deref().unwrap_or_default());
        if body.trim().is_empty() {
            return Err(DraftingError::WebExtractionFailure(
                "normalized template body is empty".to_string(),
            ));
        }

        let mut variables = normalize_variables(normalized.variables.unwrap_or_default());
        if variables.len() > self.config.max_web_variables {
            tracing::warn!(
                "Normalizer returned {} variables, keeping the first {}",
                variables.len(),
                self.config.max_web_variables
            );
            variables.truncate(self.config.max_web_variables);
        }

        let body = parametrize_body(&body, &variables);
        let tags = normalize_tags(normalized.similarity_tags.unwrap_or_default());

        Ok(NewTemplate::new(title, body, variables, tags))
    }
}

fn strip_brackets(body: &str) -> String {
    body.chars().filter(|c| !matches!(c, '[' | ']')).collect()
}
