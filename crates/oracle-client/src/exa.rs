//! Exa web search client

use async_trait::async_trait;
use drafting_core::{SearchError, WebDocument, WebSearch};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::SearchConfig;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct ExaSearch {
    config: SearchConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    use_autoprompt: bool,
    num_results: u32,
    contents: ContentsOptions,
}

#[derive(Debug, Serialize)]
struct ContentsOptions {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ExaSearch {
    pub fn new(config: SearchConfig) -> Result<Self, ClientError> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

/// Top hit of a search response; the query stands in for a missing title
fn top_document(body: &str, query: &str) -> Result<Option<WebDocument>, SearchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))?;

    Ok(response.results.into_iter().next().map(|hit| WebDocument {
        title: hit
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| query.to_string()),
        text: hit.text.unwrap_or_default(),
    }))
}

#[async_trait]
impl WebSearch for ExaSearch {
    async fn search(&self, query: &str) -> Result<Option<WebDocument>, SearchError> {
        let request = SearchRequest {
            query,
            use_autoprompt: true,
            num_results: self.config.num_results,
            contents: ContentsOptions { text: true },
        };

        debug!("Exa search: {}", query);
        let response = self
            .client
            .post(format!("{}/search", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("Exa search error: {} - {}", status, body);
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        top_document(&body, query)
    }
}
