//! Crew - agents, tasks and the engines that run them

pub mod agent;
mod runner;
mod sequential;
pub mod task;

pub use agent::AgentSpec;
pub use runner::{OrchestrationEngine, RenderedTask, TaskRunner};
pub use sequential::{SequentialEngine, TaskObserver};
pub use task::{TaskSpec, apply_overrides, quick_tasks, trip_tasks};
