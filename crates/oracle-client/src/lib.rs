//! HTTP clients for the remote collaborators of the drafting pipeline
//!
//! - `GeminiClient`: embedding and structured text generation
//! - `ExaSearch`: web search returning the top document's text
//!
//! Every client is built from an explicit configuration object; nothing here
//! reads global state after construction.

pub mod config;
pub mod error;
pub mod exa;
pub mod gemini;

pub use config::{OracleConfig, SearchConfig};
pub use error::ClientError;
pub use exa::ExaSearch;
pub use gemini::GeminiClient;
