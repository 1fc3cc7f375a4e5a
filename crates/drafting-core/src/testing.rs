//! In-process doubles for the collaborator traits, shared by unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::embeddings::Embedder;
use crate::error::{EmbeddingError, GenerationError, SearchError};
use crate::oracle::{ResponseShape, TextGenerator};
use crate::search::{WebDocument, WebSearch};

/// Bag-of-keywords embedder: one dimension per keyword plus a constant bias
pub struct KeywordEmbedder {
    keywords: Vec<String>,
    fail: bool,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            keywords: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::Request("embedder offline".into()));
        }
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| if lower.contains(k.as_str()) { 1.0 } else { 0.0 })
            .collect();
        vector.push(0.1);
        Ok(vector)
    }
}

/// Generator that answers by matching a marker inside the prompt
#[derive(Default)]
pub struct ScriptedGenerator {
    rules: Vec<(String, Result<Value, String>)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, marker: &str, value: Value) -> Self {
        self.rules.push((marker.to_string(), Ok(value)));
        self
    }

    pub fn fail(mut self, marker: &str, reason: &str) -> Self {
        self.rules.push((marker.to_string(), Err(reason.to_string())));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _shape: &ResponseShape) -> Result<Value, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.rules.iter().find(|(marker, _)| prompt.contains(marker.as_str())) {
            Some((_, Ok(value))) => Ok(value.clone()),
            Some((_, Err(reason))) => Err(GenerationError::Transport(reason.clone())),
            None => Err(GenerationError::Transport("no scripted reply".into())),
        }
    }
}

/// Search double returning a fixed outcome and recording queries
pub struct StaticSearch {
    outcome: Result<Option<WebDocument>, String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn found(title: &str, text: &str) -> Self {
        Self::with_outcome(Ok(Some(WebDocument {
            title: title.to_string(),
            text: text.to_string(),
        })))
    }

    pub fn empty() -> Self {
        Self::with_outcome(Ok(None))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_outcome(Err(reason.to_string()))
    }

    fn with_outcome(outcome: Result<Option<WebDocument>, String>) -> Self {
        Self {
            outcome,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, query: &str) -> Result<Option<WebDocument>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.outcome {
            Ok(doc) => Ok(doc.clone()),
            Err(reason) => Err(SearchError::Transport(reason.clone())),
        }
    }
}
