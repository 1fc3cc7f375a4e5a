//! Google Gemini REST client
//!
//! Implements both oracle contracts of the pipeline:
//! - `TextGenerator` via `models/{model}:generateContent` in JSON mode
//! - `Embedder` via `models/{model}:embedContent`

use async_trait::async_trait;
use drafting_core::oracle::parse_json_text;
use drafting_core::search::safe_truncate;
use drafting_core::{Embedder, EmbeddingError, GenerationError, ResponseShape, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::config::OracleConfig;
use crate::error::ClientError;

/// Longest text sent to the embedding endpoint
const MAX_EMBED_CHARS: usize = 8000;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: OracleConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

impl GeminiClient {
    pub fn new(config: OracleConfig) -> Result<Self, ClientError> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.config.base_url, model, method)
    }

    async fn post(&self, url: &str, body: &impl Serialize) -> Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn generate_request<'a>(prompt: &'a str, shape: &ResponseShape, temperature: f32) -> GenerateRequest<'a> {
    let response_schema = match shape {
        ResponseShape::JsonObject => None,
        ResponseShape::Schema(schema) => Some(schema.clone()),
    };
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature,
            response_mime_type: "application/json",
            response_schema,
        },
    }
}

/// Concatenated text of the first candidate
fn candidate_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text)
}

fn embedding_values(body: &str) -> Result<Vec<f32>, EmbeddingError> {
    let response: EmbedResponse =
        serde_json::from_str(body).map_err(|e| EmbeddingError::Request(e.to_string()))?;
    match response.embedding {
        Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
        _ => Err(EmbeddingError::Empty),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, shape: &ResponseShape) -> Result<Value, GenerationError> {
        let url = self.model_url(&self.config.generation_model, "generateContent");
        let request = generate_request(prompt, shape, self.config.temperature);

        debug!("Sending generation request ({} chars) to {}", prompt.len(), url);
        let (status, body) = self
            .post(&url, &request)
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            error!("Gemini generation error: {} - {}", status, body);
            return Err(GenerationError::Status {
                status,
                message: body,
            });
        }

        let text = candidate_text(&body)?;
        parse_json_text(&text)
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = &self.config.embedding_model;
        let url = self.model_url(model, "embedContent");
        let request = EmbedRequest {
            model: format!("models/{}", model),
            content: Content {
                parts: vec![Part {
                    text: safe_truncate(text, MAX_EMBED_CHARS),
                }],
            },
        };

        let (status, body) = self
            .post(&url, &request)
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            error!("Gemini embedding error: {} - {}", status, body);
            return Err(EmbeddingError::Request(format!("HTTP {}: {}", status, body)));
        }

        embedding_values(&body)
    }
}
