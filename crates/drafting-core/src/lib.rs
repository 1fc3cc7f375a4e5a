//! Drafting Core - template resolution and drafting pipeline
//!
//! This crate provides:
//! - Collaborator contracts (embedding, text generation, web search, analysis, storage)
//! - Candidate ranking and oracle-arbitrated template selection
//! - Fallback template acquisition from web search results
//! - Variable prefill, question generation and rendering
//! - Document ingestion into parametrized templates
//! - In-memory and file-backed template stores

pub mod acquire;
pub mod analysis;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod maintenance;
pub mod oracle;
pub mod pipeline;
pub mod prefill;
pub mod prompts;
pub mod questions;
pub mod render;
pub mod search;
pub mod seed;
pub mod storage;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use acquire::TemplateAcquirer;
pub use analysis::{AnalysisResult, DocumentAnalyzer, LlmDocumentAnalyzer};
pub use config::PipelineConfig;
pub use embeddings::Embedder;
pub use error::{
    AnalysisError, DraftingError, EmbeddingError, GenerationError, SearchError, StoreError,
};
pub use maintenance::{retarget_signature_lines, RetargetReport, DEFAULT_SIGNATURE_KEYS};
pub use oracle::{parse_json_text, OracleReply, ResponseShape, TextGenerator};
pub use pipeline::{DraftingPipeline, IngestOutcome, Resolution};
pub use questions::Questions;
pub use render::{Answers, RenderedDocument};
pub use search::{Candidate, WebDocument, WebSearch};
pub use seed::seed_store;
pub use storage::{FileStore, MemoryStore, TemplateStore};
pub use verifier::{TemplateVerifier, VerificationFinding};

pub use shared_types::{NewTemplate, Template, TemplateId, VariableSpec, VariableType};
