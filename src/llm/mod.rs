//! LLM Client Layer - Gemini API integration
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - GeminiClient implementation

pub mod client;
pub mod gemini;
pub mod types;

pub use client::{LlmClient, LlmError};
pub use gemini::GeminiClient;
pub use types::{
    CompletionRequest, CompletionResponse, Message, Part, Role, StopReason, ToolCall, ToolDefinition, Usage,
};
