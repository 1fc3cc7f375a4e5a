//! Drafting pipeline facade
//!
//! `resolve_template` runs ranking, selection, optional fallback acquisition,
//! prefill and question generation in sequence. `render` and `ingest` are the
//! other two entry points a front end needs.
//!
//! ## Architecture
//!
//! ```text
//! query ─▶ embed ─▶ shortlist (cosine, top N) ─▶ selector (oracle)
//!                                                   │
//!                      confidence >= threshold ◀────┴────▶ otherwise
//!                               │                            │
//!                        stored template             web search ─▶ normalize
//!                               │                            │       ─▶ store
//!                               └──────────┬─────────────────┘
//!                                          ▼
//!                               prefill ─▶ questions ─▶ Resolution
//! ```
//!
//! Prefill and question generation never fail a resolution; their oracle
//! failures degrade to empty prefill and fallback questions.
//!
//! ## Example
//!
//! ```no_run
//! use drafting_core::{Answers, DraftingError, DraftingPipeline};
//!
//! # async fn example(pipeline: &DraftingPipeline) -> Result<(), DraftingError> {
//! let resolution = pipeline.resolve_template("NDA between Acme and Beta").await?;
//! for key in &resolution.missing_keys {
//!     println!("{}: {}", key, resolution.missing_questions[key]);
//! }
//!
//! let mut answers = Answers::new();
//! answers.insert("effective_date".into(), "2024-03-01".into());
//! let document = pipeline
//!     .render(resolution.template.id, &answers, &resolution.prefilled)
//!     .await?;
//! println!("{}", document.output_text);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::{NewTemplate, Template, TemplateId, VariableSpec};

use crate::acquire::TemplateAcquirer;
use crate::analysis::DocumentAnalyzer;
use crate::config::PipelineConfig;
use crate::embeddings::{embed_new_template, embed_text, Embedder};
use crate::error::DraftingError;
use crate::ingest::parametrize_body;
use crate::oracle::TextGenerator;
use crate::prefill::VariablePrefiller;
use crate::questions::{QuestionGenerator, Questions};
use crate::render::{render_template, Answers, RenderedDocument};
use crate::search::{shortlist, SelectionDecision, TemplateSelector, WebSearch};
use crate::storage::TemplateStore;
use crate::verifier::TemplateVerifier;

/// Outcome of resolving a query to a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub template: Template,
    /// Selector confidence; `None` for a newly synthesized template
    pub confidence: Option<f64>,
    pub reason: Option<String>,
    pub prefilled: Answers,
    pub missing_questions: Questions,
    /// Keys still without a value, in declaration order
    pub missing_keys: Vec<String>,
    pub newly_synthesized: bool,
}

/// Outcome of ingesting an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub template_id: TemplateId,
    pub detected_variables: Vec<VariableSpec>,
}

pub struct DraftingPipeline {
    store: Arc<dyn TemplateStore>,
    embedder: Arc<dyn Embedder>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    selector: TemplateSelector,
    acquirer: TemplateAcquirer,
    prefiller: VariablePrefiller,
    questions: QuestionGenerator,
    verifier: TemplateVerifier,
    config: PipelineConfig,
}

impl DraftingPipeline {
    pub fn new(
        store: Arc<dyn TemplateStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn WebSearch>,
        analyzer: Arc<dyn DocumentAnalyzer>,
    ) -> Self {
        Self {
            selector: TemplateSelector::new(generator.clone()),
            acquirer: TemplateAcquirer::new(
                generator.clone(),
                search,
                embedder.clone(),
                store.clone(),
            ),
            prefiller: VariablePrefiller::new(generator.clone()),
            questions: QuestionGenerator::new(generator),
            verifier: TemplateVerifier::default(),
            config: PipelineConfig::default(),
            store,
            embedder,
            analyzer,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.selector = self.selector.with_threshold(config.confidence_threshold);
        self.acquirer = self.acquirer.with_config(config.clone());
        self.config = config;
        self
    }

    /// Resolve a free-text request to a template, prefill what the request
    /// states and ask for the rest
    pub async fn resolve_template(&self, query: &str) -> Result<Resolution, DraftingError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DraftingError::MatchingFailure("query is empty".to_string()));
        }

        let query_embedding = embed_text(self.embedder.as_ref(), query)
            .await
            .map_err(|e| DraftingError::MatchingFailure(format!("query embedding failed: {}", e)))?;

        let templates = self.store.list().await?;
        let candidates = shortlist(&query_embedding, &templates, self.config.shortlist_size);
        tracing::info!(
            "Ranked {} templates, top score {:?}",
            templates.len(),
            candidates.first().map(|c| c.score)
        );

        let selection = self.selector.select(query, &candidates).await;
        let (template, confidence, reason, newly_synthesized) =
            match self.selector.decide(&selection, &candidates) {
                SelectionDecision::Reuse {
                    template_id,
                    confidence,
                    reason,
                } => {
                    let template = templates
                        .into_iter()
                        .find(|t| t.id == template_id)
                        .ok_or(DraftingError::TemplateNotFound(template_id))?;
                    tracing::info!("Reusing template {} (confidence {:.2})", template_id, confidence);
                    (template, Some(confidence), Some(reason), false)
                }
                SelectionDecision::Fallback { title, reason } => {
                    if title.is_empty() {
                        let reason = if reason.is_empty() {
                            "no document type could be inferred".to_string()
                        } else {
                            reason
                        };
                        return Err(DraftingError::MatchingFailure(reason));
                    }
                    tracing::info!("No reusable template, acquiring '{}' ({})", title, reason);
                    (self.acquirer.acquire(&title).await?, None, None, true)
                }
            };

        let prefilled = self.prefiller.prefill(query, &template.variables).await;
        let missing: Vec<VariableSpec> = template
            .variables
            .iter()
            .filter(|v| !prefilled.contains_key(&v.key))
            .cloned()
            .collect();
        let missing_questions = self.questions.questions(&missing).await;

        Ok(Resolution {
            missing_keys: missing.into_iter().map(|v| v.key).collect(),
            template,
            confidence,
            reason,
            prefilled,
            missing_questions,
            newly_synthesized,
        })
    }

    /// Validate required fields and substitute the merged values
    pub async fn render(
        &self,
        template_id: TemplateId,
        answers: &Answers,
        prefilled: &Answers,
    ) -> Result<RenderedDocument, DraftingError> {
        let template = self
            .store
            .find(template_id)
            .await?
            .ok_or(DraftingError::TemplateNotFound(template_id))?;
        render_template(&template, answers, prefilled)
    }

    /// Analyze raw document text and store it as a new template
    pub async fn ingest(&self, title: &str, raw_text: &str) -> Result<IngestOutcome, DraftingError> {
        if raw_text.trim().is_empty() {
            return Err(DraftingError::ExtractionFailure(
                "document contains no text".to_string(),
            ));
        }

        let analysis = self.analyzer.analyze(raw_text).await?;
        let body = parametrize_body(raw_text, &analysis.variables);
        let template = NewTemplate::new(
            title,
            body,
            analysis.variables.clone(),
            analysis.similarity_tags,
        );
        let template = embed_new_template(self.embedder.as_ref(), template).await?;
        self.verifier.verify_and_log(&template);

        let template_id = self.store.create(template).await?;
        tracing::info!(
            "Ingested '{}' as template {} with {} variables",
            title,
            template_id,
            analysis.variables.len()
        );

        Ok(IngestOutcome {
            template_id,
            detected_variables: analysis.variables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LlmDocumentAnalyzer;
    use crate::prompts;
    use crate::storage::MemoryStore;
    use crate::testing::{KeywordEmbedder, ScriptedGenerator, StaticSearch};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pipeline(generator: ScriptedGenerator, store: Arc<MemoryStore>) -> DraftingPipeline {
        let generator: Arc<dyn TextGenerator> = Arc::new(generator);
        DraftingPipeline::new(
            store,
            Arc::new(KeywordEmbedder::new(&["nda", "lease"])),
            generator.clone(),
            Arc::new(StaticSearch::empty()),
            Arc::new(LlmDocumentAnalyzer::new(generator)),
        )
    }

    #[tokio::test]
    async fn test_empty_query_is_matching_failure() {
        let p = pipeline(ScriptedGenerator::new(), Arc::new(MemoryStore::new()));
        let err = p.resolve_template("   ").await.unwrap_err();
        assert_eq!(err.code(), "MATCHING_FAILED");
    }

    #[tokio::test]
    async fn test_query_embedding_failure_is_matching_failure() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::new());
        let p = DraftingPipeline::new(
            Arc::new(MemoryStore::new()),
            Arc::new(KeywordEmbedder::failing()),
            generator.clone(),
            Arc::new(StaticSearch::empty()),
            Arc::new(LlmDocumentAnalyzer::new(generator)),
        );
        let err = p.resolve_template("an nda").await.unwrap_err();
        assert!(matches!(err, DraftingError::MatchingFailure(_)));
    }

    #[tokio::test]
    async fn test_selection_failure_without_title_is_matching_failure() {
        let generator = ScriptedGenerator::new().fail(prompts::SELECTION_ROLE, "down");
        let p = pipeline(generator, Arc::new(MemoryStore::new()));
        let err = p.resolve_template("help me").await.unwrap_err();
        assert!(matches!(err, DraftingError::MatchingFailure(ref r) if r == "selection failed"));
    }

    #[tokio::test]
    async fn test_fallback_without_web_result() {
        let generator = ScriptedGenerator::new().reply(
            prompts::SELECTION_ROLE,
            json!({ "best_template_id": null, "confidence": 0.1, "reason": "none", "title": "Lease" }),
        );
        let p = pipeline(generator, Arc::new(MemoryStore::new()));
        let err = p.resolve_template("rent my flat").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "No template found on web for 'Lease'");
    }

    #[tokio::test]
    async fn test_configured_threshold_applies_to_selection() {
        let store = Arc::new(MemoryStore::new());
        let id = store
            .create(
                NewTemplate::new("NDA", "{{a}}", vec![], vec!["nda".into()])
                    .with_embedding(vec![1.0, 0.0, 0.1]),
            )
            .await
            .unwrap();
        let generator = ScriptedGenerator::new().reply(
            prompts::SELECTION_ROLE,
            json!({ "best_template_id": id.0, "confidence": 0.82, "reason": "nda", "title": "NDA" }),
        );
        let p = pipeline(generator, store)
            .with_config(PipelineConfig::default().with_confidence_threshold(0.9));

        let err = p.resolve_template("an nda").await.unwrap_err();
        assert!(matches!(err, DraftingError::NoWebResult(_)));
    }

    #[tokio::test]
    async fn test_render_unknown_template() {
        let p = pipeline(ScriptedGenerator::new(), Arc::new(MemoryStore::new()));
        let err = p
            .render(TemplateId(7), &Answers::new(), &Answers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DraftingError::TemplateNotFound(TemplateId(7))));
    }

    #[tokio::test]
    async fn test_ingest_parametrizes_and_stores() {
        let generator = ScriptedGenerator::new().reply(
            prompts::ANALYSIS_ROLE,
            json!({
                "variables": [
                    { "key": "tenant_name", "label": "Tenant", "example": "Mary Major", "required": true }
                ],
                "similarity_tags": ["lease"]
            }),
        );
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(generator, store.clone());

        let outcome = p
            .ingest("Flat Lease", "Tenant: Mary Major\nName: Mary Major")
            .await
            .unwrap();
        assert_eq!(outcome.detected_variables.len(), 1);

        let stored = store.find(outcome.template_id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Flat Lease");
        assert_eq!(stored.body, "Tenant: {{tenant_name}}\nName: {{tenant_name}}");
        assert_eq!(stored.embedding, Some(vec![0.0, 1.0, 0.1]));
    }

    #[tokio::test]
    async fn test_ingest_embedding_failure_stores_nothing() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::new().reply(
            prompts::ANALYSIS_ROLE,
            json!({ "variables": [], "similarity_tags": ["lease"] }),
        ));
        let store = Arc::new(MemoryStore::new());
        let p = DraftingPipeline::new(
            store.clone(),
            Arc::new(KeywordEmbedder::failing()),
            generator.clone(),
            Arc::new(StaticSearch::empty()),
            Arc::new(LlmDocumentAnalyzer::new(generator)),
        );

        let err = p.ingest("Flat Lease", "Tenant: Mary Major").await.unwrap_err();
        assert!(matches!(err, DraftingError::Embedding(_)));
        assert_eq!(err.code(), "EMBEDDING_FAILED");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_rejects_blank_text() {
        let p = pipeline(ScriptedGenerator::new(), Arc::new(MemoryStore::new()));
        let err = p.ingest("Empty", " \n ").await.unwrap_err();
        assert_eq!(err.code(), "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_ingest_analysis_failure() {
        let generator = ScriptedGenerator::new().fail(prompts::ANALYSIS_ROLE, "quota");
        let p = pipeline(generator, Arc::new(MemoryStore::new()));
        let err = p.ingest("Doc", "some text").await.unwrap_err();
        assert!(matches!(err, DraftingError::AnalysisFailure(_)));
    }
}
