//! Error types for tripcrew
//!
//! Setup and dispatch failures are hard errors and live here. Failures of a
//! tool's outbound call never surface as these types; handlers fold them into
//! an `Error: ...` result body instead.

use thiserror::Error;

/// Prompt template resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder has no value in the rendering context
    #[error("Missing template key: {0}")]
    MissingKey(String),

    /// The template engine rejected the template text
    #[error("Template render failed: {0}")]
    Render(String),
}

/// Tool registration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    #[error("Invalid tool spec '{tool}': {reason}")]
    InvalidSpec { tool: String, reason: String },
}

/// Tool dispatch errors, raised before a handler ever runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{tool}' is missing required argument '{arg}'")]
    MissingRequiredArg { tool: String, arg: String },

    #[error("Tool '{tool}' argument '{arg}' is not a valid {expected}")]
    TypeMismatch { tool: String, arg: String, expected: String },
}

/// All error types that can occur in tripcrew
#[derive(Debug, Error)]
pub enum TripError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Search gateway error (only seen outside tool handlers, e.g. diagnostics)
    #[error("Search error: {0}")]
    Search(#[from] crate::search::SearchError),

    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    /// Missing or invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Orchestration engine failure
    #[error("Engine error: {0}")]
    Engine(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for tripcrew operations
pub type Result<T> = std::result::Result<T, TripError>;
