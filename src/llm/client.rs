//! Core LLM client trait and errors

use std::time::Duration;

use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse};

/// Stateless LLM client - each call carries its full conversation
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("API key rejected ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LlmError {
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::MissingApiKey { .. } | LlmError::Auth { .. })
    }

    pub fn is_connectivity(&self) -> bool {
        match self {
            LlmError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_categories() {
        assert!(
            LlmError::MissingApiKey {
                env_var: "GOOGLE_API_KEY".to_string()
            }
            .is_auth()
        );
        assert!(
            LlmError::Auth {
                status: 401,
                message: "API key not valid".to_string()
            }
            .is_auth()
        );
        assert!(
            !LlmError::ApiError {
                status: 500,
                message: "Internal error".to_string()
            }
            .is_auth()
        );
        assert!(!LlmError::InvalidResponse("bad".to_string()).is_connectivity());
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(60),
        };
        assert_eq!(err.to_string(), "Rate limited, retry after 60s");
    }
}
