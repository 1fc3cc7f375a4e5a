//! Text-generation oracle contract
//!
//! Oracle replies are untyped JSON from a remote service. Every stage decodes
//! them into an [`OracleReply`] against a fixed serde schema before use.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GenerationError;

/// Shape the oracle is asked to respond with
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Any JSON object
    JsonObject,
    /// JSON constrained by an OpenAPI-style schema
    Schema(Value),
}

/// Structured text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run `prompt` and return the parsed JSON reply
    async fn generate(&self, prompt: &str, shape: &ResponseShape) -> Result<Value, GenerationError>;
}

/// Oracle output after schema validation
#[derive(Debug, Clone, PartialEq)]
pub enum OracleReply<T> {
    Success(T),
    Failure(String),
}

impl<T: DeserializeOwned> OracleReply<T> {
    /// Validate a raw generation result against `T`
    pub fn from_result(result: Result<Value, GenerationError>) -> Self {
        match result {
            Ok(value) => match serde_json::from_value::<T>(value) {
                Ok(payload) => OracleReply::Success(payload),
                Err(e) => OracleReply::Failure(format!("schema mismatch: {}", e)),
            },
            Err(e) => OracleReply::Failure(e.to_string()),
        }
    }
}

impl<T> OracleReply<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, OracleReply::Success(_))
    }

    /// Payload, or `fallback` after logging the failure reason under `stage`
    pub fn unwrap_or_log(self, stage: &str, fallback: T) -> T {
        match self {
            OracleReply::Success(payload) => payload,
            OracleReply::Failure(reason) => {
                tracing::warn!("{} oracle call degraded: {}", stage, reason);
                fallback
            }
        }
    }
}

/// Ask the oracle and validate the reply in one step
pub async fn ask<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    prompt: &str,
    shape: &ResponseShape,
) -> OracleReply<T> {
    OracleReply::from_result(generator.generate(prompt, shape).await)
}

/// Parse model text as JSON, tolerating a surrounding markdown code fence
pub fn parse_json_text(text: &str) -> Result<Value, GenerationError> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(GenerationError::Empty);
    }
    serde_json::from_str(json).map_err(|e| GenerationError::Malformed(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```") {
        let after_start = &trimmed[start + 3..];
        let json_start = if after_start.starts_with("json") {
            after_start.find('\n').map(|i| i + 1).unwrap_or(after_start.len())
        } else if after_start.starts_with('\n') {
            1
        } else {
            0
        };
        let content = &after_start[json_start..];
        if let Some(end) = content.find("```") {
            return content[..end].trim();
        }
    }

    trimmed
}
