//! Tool System - specs, registry/dispatcher, and the travel tool catalog

pub mod calculator;
pub mod catalog;
mod definition;
mod lookup;
mod registry;

pub use calculator::{CalcError, CalculatorTool, evaluate, format_number};
pub use catalog::{
    ALL_TOOLS, CITY_SELECTION_TOOLS, LOCAL_EXPERT_TOOLS, TRAVEL_CONCIERGE_TOOLS, standard_registry,
};
pub use definition::{ParamSpec, ParamType, ToolSpec};
pub use lookup::{ArgFormatter, SearchLookup};
pub use registry::{ERROR_PREFIX, ToolArgs, ToolHandler, ToolRegistry, ToolResult};
