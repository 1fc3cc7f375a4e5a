//! Web search contract used by the fallback path

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Top matching web document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDocument {
    pub title: String,
    pub text: String,
}

/// Web search collaborator
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return the top document for `query`, or `None` when nothing matched
    async fn search(&self, query: &str) -> Result<Option<WebDocument>, SearchError>;
}

/// Cap `text` at `max_chars` characters without splitting a word.
///
/// The cut lands on the last whitespace inside the cap. A prefix with no
/// whitespace at all is returned as-is.
pub fn safe_truncate(text: &str, max_chars: usize) -> &str {
    let Some((cut, next)) = text.char_indices().nth(max_chars) else {
        return text;
    };

    let prefix = &text[..cut];
    if next.is_whitespace() {
        return prefix.trim_end();
    }

    match prefix.rfind(char::is_whitespace) {
        Some(boundary) => prefix[..boundary].trim_end(),
        None => prefix,
    }
}
