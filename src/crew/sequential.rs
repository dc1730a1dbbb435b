//! Sequential engine - one agent at a time, each seeing earlier outputs
//!
//! Per task the model gets the agent persona as system instruction and the
//! rendered description as the user turn. Tool calls are dispatched through
//! the registry until the model answers in plain text or the round budget
//! runs out.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info, warn};

use super::runner::{OrchestrationEngine, RenderedTask};
use crate::config::Config;
use crate::error::{Result, TripError};
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason, ToolCall, Usage};
use crate::tools::{ERROR_PREFIX, ToolRegistry};
use crate::trip::TripContext;

/// Called with each task and its final output as soon as it completes
pub type TaskObserver = Box<dyn Fn(&RenderedTask, &str) + Send + Sync>;

const FINAL_ANSWER_NUDGE: &str =
    "You have used all available tool calls. Give your best final answer now using the information you already have.";

pub struct SequentialEngine {
    client: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    max_tool_rounds: u32,
    observer: Option<TaskObserver>,
    usage: Mutex<Usage>,
}

impl SequentialEngine {
    pub fn new(client: Arc<dyn LlmClient>, registry: Arc<ToolRegistry>, config: &Config) -> Self {
        Self {
            client,
            registry,
            max_tool_rounds: config.crew.max_tool_rounds,
            observer: None,
            usage: Mutex::new(Usage::default()),
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_observer(mut self, observer: TaskObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Token usage accumulated across every request so far
    pub fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| u.clone()).unwrap_or_default()
    }

    fn record_usage(&self, usage: &Usage) {
        if let Ok(mut total) = self.usage.lock() {
            total.add(usage);
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<crate::llm::CompletionResponse> {
        let response = self.client.complete(request).await?;
        self.record_usage(&response.usage);
        if response.stop_reason == StopReason::Blocked {
            return Err(TripError::Engine("model response was blocked by safety filters".to_string()));
        }
        Ok(response)
    }

    async fn run_task(&self, task: &RenderedTask, prior_outputs: &[String]) -> Result<String> {
        info!("Starting task {} ({})", task.name, task.agent.role);

        let mut request = CompletionRequest::new(task.agent.system_prompt())
            .with_user_message(task_prompt(task, prior_outputs))
            .with_tools(self.registry.definitions_for(&task.allowed_tools));

        if self.max_tool_rounds == 0 {
            debug!("Task {} runs without tools (no tool rounds configured)", task.name);
            request.tools.clear();
            let response = self.complete(request).await?;
            return finish(task, response.content);
        }

        for round in 0..self.max_tool_rounds {
            let response = self.complete(request.clone()).await?;

            if response.tool_calls.is_empty() {
                return finish(task, response.content);
            }

            debug!(
                "Task {} round {}: {} tool call(s)",
                task.name,
                round + 1,
                response.tool_calls.len()
            );

            let mut outputs = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                outputs.push((call.name.clone(), self.dispatch(task, call).await));
            }

            request = request
                .with_message(Message::assistant_tool_calls(&response.content, &response.tool_calls))
                .with_message(Message::tool_responses(outputs));
        }

        warn!(
            "Task {} reached {} tool rounds, asking for a final answer",
            task.name, self.max_tool_rounds
        );
        let mut request = request.with_user_message(FINAL_ANSWER_NUDGE);
        request.tools.clear();
        let response = self.complete(request).await?;
        finish(task, response.content)
    }

    /// Run one tool call; dispatch failures become text the model can read
    async fn dispatch(&self, task: &RenderedTask, call: &ToolCall) -> String {
        if !task.allowed_tools.iter().any(|t| t == &call.name) {
            warn!("Task {} requested tool {} outside its subset", task.name, call.name);
            return format!("{}tool '{}' is not available to this agent", ERROR_PREFIX, call.name);
        }

        match self.registry.invoke_value(&call.name, &call.input).await {
            Ok(result) => result.to_string(),
            Err(e) => {
                warn!("Task {} tool call rejected: {}", task.name, e);
                format!("{}{}", ERROR_PREFIX, e)
            }
        }
    }
}

fn finish(task: &RenderedTask, content: String) -> Result<String> {
    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(TripError::Engine(format!("task '{}' produced no output", task.name)));
    }
    info!("Finished task {} ({} chars)", task.name, content.len());
    Ok(content)
}

/// The user turn for a task: description, expected output, then earlier results
fn task_prompt(task: &RenderedTask, prior_outputs: &[String]) -> String {
    let mut prompt = format!(
        "{}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        task.description, task.expected_output
    );
    if !prior_outputs.is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(&prior_outputs.join("\n\n"));
    }
    prompt
}

#[async_trait]
impl OrchestrationEngine for SequentialEngine {
    async fn run(&self, tasks: &[RenderedTask], context: &TripContext) -> Result<String> {
        debug!("Sequential run for trip from {} to {}", context.origin, context.cities);

        let mut outputs: Vec<String> = Vec::with_capacity(tasks.len());
        for task in tasks {
            let output = self.run_task(task, &outputs).await?;
            if let Some(observer) = &self.observer {
                observer(task, &output);
            }
            outputs.push(output);
        }

        let usage = self.total_usage();
        info!(
            "Run complete: {} input / {} output tokens",
            usage.input_tokens, usage.output_tokens
        );

        outputs
            .pop()
            .ok_or_else(|| TripError::Engine("no tasks to run".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::agent::AgentSpec;
    use crate::llm::{CompletionResponse, LlmError, Part};
    use crate::search::{SearchError, SearchGateway};
    use crate::tools::standard_registry;
    use serde_json::json;
    use std::collections::VecDeque;

    struct FixedSearch;

    #[async_trait]
    impl SearchGateway for FixedSearch {
        async fn search(&self, query: &str) -> std::result::Result<String, SearchError> {
            Ok(format!("found: {}", query))
        }
    }

    /// Replays canned responses and records every request
    #[derive(Default)]
    struct Scripted {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for Scripted {
        async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn text(content: &str) -> CompletionResponse {
        CompletionResponse {
            content: content.to_string(),
            usage: Usage::new(10, 5),
            ..Default::default()
        }
    }

    fn calls(calls: Vec<ToolCall>) -> CompletionResponse {
        CompletionResponse {
            tool_calls: calls,
            stop_reason: StopReason::ToolUse,
            usage: Usage::new(10, 5),
            ..Default::default()
        }
    }

    fn task(name: &str, tools: &[&str]) -> RenderedTask {
        RenderedTask {
            name: name.to_string(),
            agent: AgentSpec::new("Tester", "Test things", "You test.", tools),
            description: format!("Do {}", name),
            allowed_tools: tools.iter().map(|t| t.to_string()).collect(),
            expected_output: "A result".to_string(),
        }
    }

    fn engine(client: Arc<Scripted>) -> SequentialEngine {
        let registry = Arc::new(standard_registry(Arc::new(FixedSearch)).unwrap());
        SequentialEngine::new(client, registry, &Config::default())
    }

    fn tool_response_text(request: &CompletionRequest) -> String {
        match request.messages.last().map(|m| &m.parts[0]) {
            Some(Part::ToolResponse { content, .. }) => content.clone(),
            other => panic!("expected tool response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prior_outputs_feed_later_tasks() {
        let client = Scripted::new(vec![text("Pick Paris"), text("Paris guide"), text("Final plan")]);
        let tasks = vec![task("one", &[]), task("two", &[]), task("three", &[])];

        let output = engine(client.clone())
            .run(&tasks, &TripContext::default())
            .await
            .unwrap();

        assert_eq!(output, "Final plan");
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(!requests[0].messages[0].text().contains("context you're working with"));
        let last = requests[2].messages[0].text();
        assert!(last.starts_with("Do three"));
        assert!(last.contains("Pick Paris\n\nParis guide"));
        assert_eq!(requests[2].system, "You are Tester. You test.\nYour personal goal is: Test things");
    }

    #[tokio::test]
    async fn test_tool_loop_dispatches_through_registry() {
        let client = Scripted::new(vec![
            calls(vec![ToolCall::new("call_1", "calculator_tool", json!({ "operation": "120 * 7" }))]),
            text("Budget is 840"),
        ]);
        let engine = engine(client.clone());

        let output = engine
            .run(&[task("budget", &["calculator_tool"])], &TripContext::default())
            .await
            .unwrap();

        assert_eq!(output, "Budget is 840");
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(tool_response_text(&requests[1]), "Calculation:\n120 * 7 = 840");
        assert_eq!(engine.total_usage(), Usage::new(20, 10));
    }

    #[tokio::test]
    async fn test_dispatch_errors_are_reported_to_model() {
        let client = Scripted::new(vec![
            calls(vec![ToolCall::new("call_1", "weather_tool", json!({}))]),
            calls(vec![ToolCall::new("call_1", "safety_tool", json!({ "city": "Rome" }))]),
            text("done"),
        ]);

        engine(client.clone())
            .run(&[task("weather", &["weather_tool"])], &TripContext::default())
            .await
            .unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(
            tool_response_text(&requests[1]),
            "Error: Tool 'weather_tool' is missing required argument 'city'"
        );
        assert_eq!(
            tool_response_text(&requests[2]),
            "Error: tool 'safety_tool' is not available to this agent"
        );
    }

    #[tokio::test]
    async fn test_round_budget_forces_final_answer() {
        let call = ToolCall::new("call_1", "search", json!({ "query": "Lisbon" }));
        let client = Scripted::new(vec![calls(vec![call.clone()]), calls(vec![call]), text("best effort")]);

        let output = engine(client.clone())
            .with_max_tool_rounds(2)
            .run(&[task("research", &["search"])], &TripContext::default())
            .await
            .unwrap();

        assert_eq!(output, "best effort");
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tools.is_empty());
        assert_eq!(requests[2].messages.last().unwrap().text(), FINAL_ANSWER_NUDGE);
    }

    #[tokio::test]
    async fn test_zero_rounds_answers_without_tools() {
        let client = Scripted::new(vec![text("straight answer")]);

        let output = engine(client.clone())
            .with_max_tool_rounds(0)
            .run(&[task("direct", &["search"])], &TripContext::default())
            .await
            .unwrap();

        assert_eq!(output, "straight answer");
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].tools.is_empty());
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].messages[0].text().starts_with("Do direct"));
        assert!(!requests[0].messages[0].text().contains(FINAL_ANSWER_NUDGE));
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let client = Scripted::new(vec![text("   ")]);
        let err = engine(client)
            .run(&[task("silent", &[])], &TripContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TripError::Engine(_)));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let client = Scripted::new(vec![]);
        let err = engine(client)
            .run(&[task("any", &[])], &TripContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TripError::Llm(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_observer_sees_each_task() {
        let client = Scripted::new(vec![text("a"), text("b")]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        engine(client)
            .with_observer(Box::new(move |task: &RenderedTask, output: &str| {
                sink.lock().unwrap().push(format!("{}={}", task.name, output));
            }))
            .run(&[task("x", &[]), task("y", &[])], &TripContext::default())
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["x=a", "y=b"]);
    }
}
