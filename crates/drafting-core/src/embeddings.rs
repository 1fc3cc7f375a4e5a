//! Embedding oracle contract
//!
//! Maps text to a fixed-length vector. Templates are embedded from
//! `title + tags`; queries are embedded verbatim.

use async_trait::async_trait;
use shared_types::NewTemplate;

use crate::error::EmbeddingError;

/// Remote (or local) embedding model
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Embed `text`, rejecting an empty vector
pub async fn embed_text(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    let vector = embedder.embed(text).await?;
    if vector.is_empty() {
        return Err(EmbeddingError::Empty);
    }
    tracing::debug!("Embedded {} chars into {} dimensions", text.len(), vector.len());
    Ok(vector)
}

/// Attach an embedding computed from the template's title and tags
pub async fn embed_new_template(
    embedder: &dyn Embedder,
    template: NewTemplate,
) -> Result<NewTemplate, EmbeddingError> {
    let vector = embed_text(embedder, &template.embedding_text()).await?;
    Ok(template.with_embedding(vector))
}
