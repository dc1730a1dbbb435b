//! Search Gateway - the single outbound dependency of every lookup tool
//!
//! A gateway takes a free-text query and returns unstructured text. Ranking,
//! authentication and rate limiting are the provider's concern.

mod serper;

pub use serper::SerperGateway;

use async_trait::async_trait;

/// Free-text web search
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Run one query, returning the provider's results flattened to text
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

/// Errors that can occur while talking to a search provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Search API key is not configured")]
    MissingApiKey,

    #[error("Search request timed out: {0}")]
    Timeout(String),

    #[error("Search connection failed: {0}")]
    Network(String),

    #[error("Search API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

/// Stand-in used when no search key is configured; every query fails
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl SearchGateway for DisabledGateway {
    async fn search(&self, _query: &str) -> Result<String, SearchError> {
        Err(SearchError::MissingApiKey)
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout(e.to_string())
        } else if e.is_decode() {
            SearchError::InvalidResponse(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }
}
