//! Error types for the drafting pipeline and its collaborators

use shared_types::TemplateId;
use thiserror::Error;

/// Failure of the embedding oracle
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("No embedding returned")]
    Empty,
}

/// Failure of the text-generation oracle
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Transport(String),

    #[error("Generation API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Empty response from generation API")]
    Empty,

    #[error("Malformed JSON from generation API: {0}")]
    Malformed(String),
}

/// Failure of the web search collaborator
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Web search request failed: {0}")]
    Transport(String),

    #[error("Web search returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed web search response: {0}")]
    Malformed(String),
}

/// Failure of the document analysis collaborator
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Analysis output did not match the expected schema: {0}")]
    Malformed(String),
}

/// Template store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Template not found: {0}")]
    NotFound(TemplateId),

    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fatal outcomes of a drafting, ingestion or render request
#[derive(Error, Debug)]
pub enum DraftingError {
    #[error("Failed to extract text: {0}")]
    ExtractionFailure(String),

    #[error("Document analysis failed: {0}")]
    AnalysisFailure(#[from] AnalysisError),

    #[error("Template matching failed: {0}")]
    MatchingFailure(String),

    #[error("No template found on web for '{0}'")]
    NoWebResult(String),

    #[error("Web search failed: {0}")]
    WebSearchFailure(#[from] SearchError),

    #[error("Failed to extract template from web result: {0}")]
    WebExtractionFailure(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("Missing required field: {label}")]
    ValidationFailure { key: String, label: String },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DraftingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DraftingError::TemplateNotFound(id),
            other => DraftingError::Store(other),
        }
    }
}

impl DraftingError {
    /// HTTP-style status: 4xx when the caller can correct the request, 5xx otherwise
    pub fn status_code(&self) -> u16 {
        match self {
            DraftingError::ExtractionFailure(_) => 400,
            DraftingError::ValidationFailure { .. } => 400,
            DraftingError::TemplateNotFound(_) => 404,
            DraftingError::NoWebResult(_) => 404,
            DraftingError::WebSearchFailure(_) => 502,
            DraftingError::AnalysisFailure(_)
            | DraftingError::MatchingFailure(_)
            | DraftingError::WebExtractionFailure(_)
            | DraftingError::Embedding(_)
            | DraftingError::Store(_) => 500,
        }
    }

    /// Machine-readable reason string
    pub fn code(&self) -> &'static str {
        match self {
            DraftingError::ExtractionFailure(_) => "EXTRACTION_FAILED",
            DraftingError::AnalysisFailure(_) => "ANALYSIS_FAILED",
            DraftingError::MatchingFailure(_) => "MATCHING_FAILED",
            DraftingError::NoWebResult(_) => "NO_WEB_RESULT",
            DraftingError::WebSearchFailure(_) => "WEB_SEARCH_FAILED",
            DraftingError::WebExtractionFailure(_) => "WEB_EXTRACTION_FAILED",
            DraftingError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            DraftingError::ValidationFailure { .. } => "VALIDATION_FAILED",
            DraftingError::Embedding(_) => "EMBEDDING_FAILED",
            DraftingError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
