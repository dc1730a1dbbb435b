//! Task Runner - resolves templates and hands the tasks to an engine
//!
//! Everything that can fail hard (unknown tools, missing placeholders) is
//! checked before the engine sees a single task.

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::agent::AgentSpec;
use super::task::TaskSpec;
use crate::error::{Result, TripError};
use crate::prompt::PromptRenderer;
use crate::tools::ToolRegistry;
use crate::trip::TripContext;

/// A task whose template has been filled in
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTask {
    pub name: String,
    pub agent: AgentSpec,
    pub description: String,
    pub allowed_tools: Vec<String>,
    pub expected_output: String,
}

/// Executes rendered tasks in order and returns the final artifact
#[async_trait]
pub trait OrchestrationEngine: Send + Sync {
    async fn run(&self, tasks: &[RenderedTask], context: &TripContext) -> Result<String>;
}

pub struct TaskRunner {
    registry: Arc<ToolRegistry>,
    renderer: PromptRenderer,
    engine: Arc<dyn OrchestrationEngine>,
}

impl TaskRunner {
    pub fn new(registry: Arc<ToolRegistry>, engine: Arc<dyn OrchestrationEngine>) -> Self {
        Self {
            registry,
            renderer: PromptRenderer::new(),
            engine,
        }
    }

    /// Validate and render every task without running anything
    pub fn prepare(&self, tasks: &[TaskSpec], context: &TripContext) -> Result<Vec<RenderedTask>> {
        for task in tasks {
            self.registry.check_names(&task.allowed_tools)?;
        }

        tasks
            .iter()
            .map(|task| {
                let description = self.renderer.render(&task.template, context)?;
                Ok(RenderedTask {
                    name: task.name.clone(),
                    agent: task.agent.clone(),
                    description,
                    allowed_tools: task.allowed_tools.clone(),
                    expected_output: task.expected_output.clone(),
                })
            })
            .collect()
    }

    /// Render all tasks, then run them through the engine
    pub async fn run(&self, tasks: &[TaskSpec], context: &TripContext) -> Result<String> {
        if tasks.is_empty() {
            return Err(TripError::Engine("no tasks to run".to_string()));
        }

        let rendered = self.prepare(tasks, context)?;
        info!("Running {} task(s)", rendered.len());
        self.engine.run(&rendered, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::task::{quick_tasks, trip_tasks};
    use crate::error::{DispatchError, TemplateError};
    use crate::search::{SearchError, SearchGateway};
    use crate::tools::standard_registry;
    use std::sync::Mutex;

    struct NoSearch;

    #[async_trait]
    impl SearchGateway for NoSearch {
        async fn search(&self, _query: &str) -> std::result::Result<String, SearchError> {
            Err(SearchError::MissingApiKey)
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OrchestrationEngine for Recording {
        async fn run(&self, tasks: &[RenderedTask], _context: &TripContext) -> Result<String> {
            let mut seen = self.seen.lock().unwrap();
            seen.extend(tasks.iter().map(|t| t.name.clone()));
            Ok(tasks.iter().map(|t| t.description.as_str()).collect::<Vec<_>>().join("\n---\n"))
        }
    }

    fn runner(engine: Arc<Recording>) -> TaskRunner {
        let registry = Arc::new(standard_registry(Arc::new(NoSearch)).unwrap());
        TaskRunner::new(registry, engine)
    }

    fn trip() -> TripContext {
        TripContext::new("New York", "Paris, Tokyo", "June 2024", "food, museums")
    }

    #[tokio::test]
    async fn test_run_passes_tasks_in_order() {
        let engine = Arc::new(Recording::default());
        let output = runner(engine.clone()).run(&trip_tasks(), &trip()).await.unwrap();

        assert_eq!(
            *engine.seen.lock().unwrap(),
            vec!["city_selection", "local_expert", "itinerary"]
        );
        assert!(output.contains("Paris, Tokyo"));
        assert!(!output.contains("{{"));
    }

    #[tokio::test]
    async fn test_missing_key_aborts_before_engine() {
        let engine = Arc::new(Recording::default());
        let mut tasks = quick_tasks();
        tasks.push(TaskSpec::new(
            "budget",
            "Budget for {{currency}} in {{cities}}",
            tasks[0].agent.clone(),
            "A budget",
        ));

        let err = runner(engine.clone()).run(&tasks, &trip()).await.unwrap_err();

        assert!(matches!(err, TripError::Template(TemplateError::MissingKey(ref k)) if k == "currency"));
        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_aborts_before_engine() {
        let engine = Arc::new(Recording::default());
        let mut tasks = trip_tasks();
        tasks[2].allowed_tools.push("teleport_tool".to_string());

        let err = runner(engine.clone()).run(&tasks, &trip()).await.unwrap_err();

        assert!(matches!(
            err,
            TripError::Dispatch(DispatchError::UnknownTool(ref name)) if name == "teleport_tool"
        ));
        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let engine = Arc::new(Recording::default());
        let err = runner(engine).run(&[], &trip()).await.unwrap_err();
        assert!(matches!(err, TripError::Engine(_)));
    }

    #[test]
    fn test_prepare_renders_trip_details() {
        let engine = Arc::new(Recording::default());
        let rendered = runner(engine).prepare(&trip_tasks(), &trip()).unwrap();

        let city = &rendered[0].description;
        assert!(city.starts_with("**CITY SELECTION ANALYSIS TASK**"));
        for value in ["New York", "Paris, Tokyo", "June 2024", "food, museums"] {
            assert!(city.contains(value), "missing {}", value);
        }
        assert_eq!(rendered[0].allowed_tools.len(), 7);
    }
}
