#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use drafting_core::prompts;
use drafting_core::{
    DraftingPipeline, Embedder, EmbeddingError, GenerationError, LlmDocumentAnalyzer,
    MemoryStore, ResponseShape, SearchError, TextGenerator, WebDocument, WebSearch,
};
use serde_json::Value;

/// One dimension per keyword plus a constant bias
pub struct KeywordEmbedder(pub Vec<&'static str>);

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = self
            .0
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect();
        v.push(0.1);
        Ok(v)
    }
}

/// Replies keyed by the role line each prompt starts with
#[derive(Default)]
pub struct Oracle {
    pub selection: Option<Value>,
    pub prefill: Option<Value>,
    pub questions: Option<Value>,
    pub normalize: Option<Value>,
    pub prompts: Mutex<Vec<String>>,
}

impl Oracle {
    pub fn prompts_with(&self, role: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.starts_with(role))
            .count()
    }
}

#[async_trait]
impl TextGenerator for Oracle {
    async fn generate(&self, prompt: &str, _shape: &ResponseShape) -> Result<Value, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = if prompt.starts_with(prompts::SELECTION_ROLE) {
            &self.selection
        } else if prompt.starts_with(prompts::PREFILL_ROLE) {
            &self.prefill
        } else if prompt.starts_with(prompts::QUESTION_ROLE) {
            &self.questions
        } else if prompt.starts_with(prompts::NORMALIZE_ROLE) {
            &self.normalize
        } else {
            &None
        };
        reply
            .clone()
            .ok_or_else(|| GenerationError::Transport("unscripted prompt".into()))
    }
}

#[derive(Default)]
pub struct Search {
    pub result: Option<WebDocument>,
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl WebSearch for Search {
    async fn search(&self, query: &str) -> Result<Option<WebDocument>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.result.clone())
    }
}

pub fn embedder() -> Arc<KeywordEmbedder> {
    Arc::new(KeywordEmbedder(vec!["nda", "lease", "employment"]))
}

pub fn pipeline(store: Arc<MemoryStore>, oracle: Arc<Oracle>, search: Arc<Search>) -> DraftingPipeline {
    DraftingPipeline::new(
        store,
        embedder(),
        oracle.clone(),
        search,
        Arc::new(LlmDocumentAnalyzer::new(oracle)),
    )
}
