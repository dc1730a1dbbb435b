//! Tool registry and dispatcher
//!
//! Maps tool names to a spec and a handler. `invoke` validates and coerces
//! arguments before the handler runs; handler failures never escape as
//! errors (see [`ToolHandler::call`]).

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{Map, Value};

use super::definition::ToolSpec;
use crate::error::{DispatchError, RegistrationError};
use crate::llm::ToolDefinition;

/// Prefix marking a fail-soft result body
pub const ERROR_PREFIX: &str = "Error: ";

/// Validated, coerced arguments handed to a handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// String argument, or `""` when absent
    pub fn str(&self, name: &str) -> &str {
        self.values.get(name).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Outcome of one successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub label: String,
    pub body: String,
}

impl ToolResult {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }

    /// True when the handler degraded its outbound failure into the body
    pub fn is_error(&self) -> bool {
        self.body.starts_with(ERROR_PREFIX)
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\n{}", self.label, self.body)
    }
}

/// Executes one tool with already-validated arguments
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Fixed descriptive label formatted with the resolved args
    fn label(&self, args: &ToolArgs) -> String;

    /// Run the tool. Outbound failures must be caught and returned as a
    /// body starting with [`ERROR_PREFIX`].
    async fn call(&self, args: &ToolArgs) -> String;
}

struct Registered {
    spec: ToolSpec,
    handler: Box<dyn ToolHandler>,
}

/// Name-keyed tool map with registration-order listing
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Registered>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, rejecting duplicate names and inconsistent specs
    pub fn register(&mut self, spec: ToolSpec, handler: impl ToolHandler + 'static) -> Result<(), RegistrationError> {
        spec.validate()?;
        if self.tools.contains_key(&spec.name) {
            return Err(RegistrationError::DuplicateName(spec.name));
        }

        debug!("Registered tool {}", spec.name);
        self.order.push(spec.name.clone());
        self.tools.insert(
            spec.name.clone(),
            Registered {
                spec,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Validate `args` against the tool's parameters, filling defaults
    ///
    /// Arguments the tool does not declare are dropped.
    pub fn validate(&self, name: &str, args: &Map<String, Value>) -> Result<ToolArgs, DispatchError> {
        let spec = &self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?
            .spec;

        let mut values = Map::new();
        for param in &spec.parameters {
            match args.get(&param.name).filter(|v| !v.is_null()) {
                Some(raw) => {
                    let coerced = param.param_type.coerce(raw).ok_or_else(|| DispatchError::TypeMismatch {
                        tool: name.to_string(),
                        arg: param.name.clone(),
                        expected: param.param_type.to_string(),
                    })?;
                    values.insert(param.name.clone(), coerced);
                }
                None if param.required => {
                    return Err(DispatchError::MissingRequiredArg {
                        tool: name.to_string(),
                        arg: param.name.clone(),
                    });
                }
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }

        for extra in args.keys().filter(|k| spec.param(k).is_none()) {
            debug!("Tool {} ignoring undeclared argument '{}'", name, extra);
        }

        Ok(ToolArgs::new(values))
    }

    /// Dispatch one call by name
    pub async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<ToolResult, DispatchError> {
        let args = self.validate(name, args)?;
        let registered = self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        debug!("Invoking tool {} with {:?}", name, args.as_map());
        let label = registered.handler.label(&args);
        let body = registered.handler.call(&args).await;
        let result = ToolResult::new(label, body);

        if result.is_error() {
            warn!("Tool {} degraded: {}", name, result.body);
        }
        Ok(result)
    }

    /// Dispatch with a raw JSON value as produced by an LLM tool call
    pub async fn invoke_value(&self, name: &str, args: &Value) -> Result<ToolResult, DispatchError> {
        match args {
            Value::Object(map) => self.invoke(name, map).await,
            Value::Null => self.invoke(name, &Map::new()).await,
            _ => {
                if !self.contains(name) {
                    return Err(DispatchError::UnknownTool(name.to_string()));
                }
                Err(DispatchError::TypeMismatch {
                    tool: name.to_string(),
                    arg: "arguments".to_string(),
                    expected: "object".to_string(),
                })
            }
        }
    }

    /// Spec for a registered tool
    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|r| &r.spec)
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Specs in registration order
    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.order.iter().filter_map(|name| self.spec(name))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.specs().map(ToolSpec::to_definition).collect()
    }

    /// Get tool definitions for specific tool names, in the order given
    pub fn definitions_for<S: AsRef<str>>(&self, names: &[S]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.spec(name.as_ref()))
            .map(ToolSpec::to_definition)
            .collect()
    }

    /// Fail with the first name that is not registered
    pub fn check_names<S: AsRef<str>>(&self, names: &[S]) -> Result<(), DispatchError> {
        match names.iter().find(|n| !self.contains(n.as_ref())) {
            Some(missing) => Err(DispatchError::UnknownTool(missing.as_ref().to_string())),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.order).finish()
    }
}
