//! Search module - candidate ranking, selection gating and web search
//!
//! This module provides:
//! - Cosine-similarity ranking of stored templates against a query embedding
//! - Oracle-arbitrated selection with a confidence threshold
//! - The web search contract used by the fallback path
//!
//! ## Architecture
//!
//! ```text
//! query embedding ─▶ vector::rank_candidates ─▶ vector::shortlist
//!                                                     │
//!                              gating::TemplateSelector::select (oracle)
//!                                                     │
//!                              gating::TemplateSelector::decide
//!                                    │                      │
//!                                  Reuse                 Fallback ─▶ web::WebSearch
//! ```
//!
//! Ranking is pure and deterministic. Ties keep store order, and templates
//! without an embedding never reach the selector.
//!
//! ## Example
//!
//! ```
//! use drafting_core::search::{cosine_similarity, shortlist};
//! use drafting_core::Template;
//!
//! let score = cosine_similarity(&[1.0, 0.0], &[1.0, 1.0]);
//! assert!((score - 0.707).abs() < 1e-3);
//!
//! let templates: Vec<Template> = Vec::new();
//! assert!(shortlist(&[1.0, 0.0], &templates, 3).is_empty());
//! ```

pub mod gating;
pub mod vector;
pub mod web;

pub use gating::{SelectionDecision, SelectionResult, TemplateSelector};
pub use vector::{cosine_similarity, rank_candidates, shortlist};
pub use web::{safe_truncate, WebDocument, WebSearch};

use serde::{Deserialize, Serialize};
use shared_types::TemplateId;

/// A ranked template, as shown to the selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: TemplateId,
    pub title: String,
    pub tags: Vec<String>,
    /// Cosine similarity rounded to three decimals
    pub score: f32,
}
