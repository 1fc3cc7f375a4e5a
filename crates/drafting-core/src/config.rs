//! Tunables for the drafting pipeline
//!
//! Defaults reproduce the reference behaviour: reuse at confidence >= 0.6,
//! a three-candidate shortlist, web text capped at 3000 characters and at
//! most six variables on a synthesized template.

use serde::{Deserialize, Serialize};

/// Minimum selector confidence for reusing a stored template
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Number of ranked candidates handed to the selector
pub const DEFAULT_SHORTLIST_SIZE: usize = 3;

/// Character cap applied to web text before normalization
pub const DEFAULT_WEB_TEXT_CAP: usize = 3000;

/// Variable cap for web-synthesized templates
pub const DEFAULT_MAX_WEB_VARIABLES: usize = 6;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Confidence at or above which the selector's choice is reused
    pub confidence_threshold: f64,
    /// How many ranked candidates the selector sees
    pub shortlist_size: usize,
    /// Maximum characters of web text sent for normalization
    pub web_text_cap: usize,
    /// Maximum variables kept on a web-synthesized template
    pub max_web_variables: usize,
    /// Appended to the inferred title to form the web search query
    pub search_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            shortlist_size: DEFAULT_SHORTLIST_SIZE,
            web_text_cap: DEFAULT_WEB_TEXT_CAP,
            max_web_variables: DEFAULT_MAX_WEB_VARIABLES,
            search_suffix: "legal document example".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_shortlist_size(mut self, size: usize) -> Self {
        self.shortlist_size = size;
        self
    }

    pub fn with_web_text_cap(mut self, cap: usize) -> Self {
        self.web_text_cap = cap;
        self
    }

    pub fn with_max_web_variables(mut self, max: usize) -> Self {
        self.max_web_variables = max;
        self
    }

    /// Web search query for an inferred document title
    pub fn search_query(&self, title: &str) -> String {
        format!("{} {}", title.trim(), self.search_suffix)
    }
}
