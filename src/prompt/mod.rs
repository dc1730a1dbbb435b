//! Prompt System - template definitions, loading and rendering
//!
//! Templates use `{{name}}` placeholders. Rendering checks every key against
//! the context first, then substitutes values in a single pass.

mod loader;
mod render;
mod template;

pub use loader::PromptLoader;
pub use render::PromptRenderer;
pub use template::{PromptTemplate, dedent, has_placeholders};
