//! Tripcrew - travel planning with a crew of prompt-driven agents
//!
//! The core is a prompt-templating layer ([`prompt`]) and a tool registry
//! and dispatcher ([`tools`]) whose handlers each forward one query to a
//! [`search::SearchGateway`]. Task sequencing lives behind
//! [`crew::OrchestrationEngine`]; the bundled [`crew::SequentialEngine`]
//! drives a Gemini model through [`llm::LlmClient`].

pub mod config;
pub mod crew;
pub mod diagnostics;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod search;
pub mod tools;
pub mod trip;

pub use error::{DispatchError, RegistrationError, Result, TemplateError, TripError};
pub use trip::TripContext;
