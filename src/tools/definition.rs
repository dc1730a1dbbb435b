//! Tool specifications and parameter coercion
//!
//! A [`ToolSpec`] is immutable once registered. Its ordered parameter list
//! drives both argument validation and the JSON schema offered to the LLM.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::RegistrationError;
use crate::llm::ToolDefinition;

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    /// JSON schema type name
    pub fn schema_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Coerce a caller-supplied value to this type
    ///
    /// Returns `None` when the value cannot be represented as this type.
    /// Callers treat `Value::Null` as an absent argument before calling this.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

            (Self::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64).map(|f| f as i64))
                .map(Value::from),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),

            (Self::Number, Value::Number(_)) => Some(value.clone()),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from),

            (Self::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Self::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },

            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_type())
    }
}

/// One declared parameter of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: String,
}

impl ParamSpec {
    /// A required string parameter
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: ParamType::String,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// An optional string parameter with a default
    pub fn optional(name: impl Into<String>, default: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: ParamType::String,
            required: false,
            default: Some(Value::String(default.into())),
            description: description.into(),
        }
    }

    /// Override the declared type
    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    fn schema(&self) -> Value {
        let mut description = self.description.clone();
        if let Some(default) = &self.default {
            let shown = match default {
                Value::String(s) if s.is_empty() => "empty".to_string(),
                Value::String(s) => format!("\"{}\"", s),
                other => other.to_string(),
            };
            description = format!("{} (default: {})", description, shown);
        }
        json!({ "type": self.param_type.schema_type(), "description": description })
    }
}

/// A registered tool: name, description and ordered parameter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, unique within a registry
    pub name: String,
    /// Human-readable description for the LLM
    pub description: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    /// Create a spec with no parameters
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Look up a parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check the parameter list is internally consistent
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidSpec {
            tool: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
            if let Some(default) = &param.default {
                if param.required {
                    return Err(invalid(format!("required parameter '{}' has a default", param.name)));
                }
                if param.param_type.coerce(default).is_none() {
                    return Err(invalid(format!(
                        "default for '{}' is not a valid {}",
                        param.name, param.param_type
                    )));
                }
            }
        }

        Ok(())
    }

    /// JSON schema for the parameter object
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Convert to LLM ToolDefinition for API calls
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name.clone(), self.description.clone(), self.input_schema())
    }

    /// One-line signature, e.g. `weather_tool(city, date_range="")`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{}={}", p.name, default),
                None => p.name.clone(),
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_spec() -> ToolSpec {
        ToolSpec::new("weather_tool", "Get weather forecast")
            .with_param(ParamSpec::required("city", "The city name"))
            .with_param(ParamSpec::optional("date_range", "", "The date range"))
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(ParamType::String.coerce(&json!("Paris")), Some(json!("Paris")));
        assert_eq!(ParamType::String.coerce(&json!(2024)), Some(json!("2024")));
        assert_eq!(ParamType::String.coerce(&json!(true)), Some(json!("true")));
        assert_eq!(ParamType::String.coerce(&json!(["a"])), None);
        assert_eq!(ParamType::String.coerce(&json!({"a": 1})), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(ParamType::Integer.coerce(&json!("42")), Some(json!(42)));
        assert_eq!(ParamType::Integer.coerce(&json!(7.0)), Some(json!(7)));
        assert_eq!(ParamType::Integer.coerce(&json!(7.5)), None);
        assert_eq!(ParamType::Integer.coerce(&json!("seven")), None);
        assert_eq!(ParamType::Number.coerce(&json!(" 2.5 ")), Some(json!(2.5)));
        assert_eq!(ParamType::Number.coerce(&json!("NaN")), None);
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(ParamType::Boolean.coerce(&json!("TRUE")), Some(json!(true)));
        assert_eq!(ParamType::Boolean.coerce(&json!(false)), Some(json!(false)));
        assert_eq!(ParamType::Boolean.coerce(&json!("yes")), None);
        assert_eq!(ParamType::Boolean.coerce(&json!(1)), None);
    }

    #[test]
    fn test_input_schema() {
        let schema = weather_spec().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["city"]["type"], "string");
        assert_eq!(schema["required"], json!(["city"]));
        assert_eq!(
            schema["properties"]["date_range"]["description"],
            "The date range (default: empty)"
        );
        assert!(schema["properties"]["date_range"].get("default").is_none());
    }

    #[test]
    fn test_to_definition() {
        let def = weather_spec().to_definition();
        assert_eq!(def.name, "weather_tool");
        assert_eq!(def.description, "Get weather forecast");
        assert!(def.input_schema["properties"]["city"].is_object());
    }

    #[test]
    fn test_validate_ok() {
        assert!(weather_spec().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let err = ToolSpec::new(" ", "nothing").validate().unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidSpec { .. }));
    }

    #[test]
    fn test_validate_duplicate_param() {
        let spec = weather_spec().with_param(ParamSpec::required("city", "again"));
        let err = spec.validate().unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidSpec {
                tool: "weather_tool".to_string(),
                reason: "duplicate parameter 'city'".to_string()
            }
        );
    }

    #[test]
    fn test_validate_default_type() {
        let spec = ToolSpec::new("nights", "Count nights")
            .with_param(ParamSpec::optional("count", "many", "Nights").with_type(ParamType::Integer));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_signature() {
        assert_eq!(weather_spec().signature(), "weather_tool(city, date_range=\"\")");
    }
}
