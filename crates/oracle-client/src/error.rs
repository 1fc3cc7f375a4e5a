use thiserror::Error;

/// Failure while constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API key is empty")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
