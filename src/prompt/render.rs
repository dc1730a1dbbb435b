//! Prompt Renderer - fill `{{name}}` placeholders from a context
//!
//! Rendering is all-or-nothing: every placeholder is checked against the
//! context before any text is produced, so a missing key never yields a
//! partial prompt. Everything that is not a placeholder passes through
//! unchanged, including literal braces such as JSON examples.

use serde::Serialize;
use serde_json::Value;

use crate::error::TemplateError;

use super::template::PromptTemplate;

/// Renders prompt templates by direct placeholder substitution
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptRenderer;

impl PromptRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a template with any serializable context
    ///
    /// The context must serialize to a map. Non-string values are rendered
    /// with their JSON text. Fails with [`TemplateError::MissingKey`] naming
    /// the first placeholder (left to right) that the context does not supply.
    pub fn render<T: Serialize>(&self, template: &PromptTemplate, context: &T) -> Result<String, TemplateError> {
        let context = serde_json::to_value(context).map_err(|e| TemplateError::Render(e.to_string()))?;
        self.render_json(template, &context)
    }

    /// Render a template with a JSON context
    pub fn render_json(&self, template: &PromptTemplate, context: &Value) -> Result<String, TemplateError> {
        for key in template.placeholders() {
            let present = context.get(key).is_some_and(|v| !v.is_null());
            if !present {
                return Err(TemplateError::MissingKey(key.to_string()));
            }
        }

        Ok(template.fill(|key| context.get(key).map(value_text).unwrap_or_default()))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
