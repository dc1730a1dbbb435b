//! Task definitions
//!
//! Templates are compiled in from `prompts/`. A [`PromptLoader`] may supply
//! on-disk overrides keyed by task name.

use serde::{Deserialize, Serialize};

use super::agent::{AgentSpec, city_selection_expert, local_area_expert, quick_city_advisor, travel_concierge};
use crate::error::Result;
use crate::prompt::{PromptLoader, PromptTemplate};

pub const CITY_SELECTION: &str = "city_selection";
pub const LOCAL_EXPERT: &str = "local_expert";
pub const ITINERARY: &str = "itinerary";
pub const QUICK_CITY: &str = "quick_city";

const CITY_SELECTION_TEMPLATE: &str = include_str!("../../prompts/city_selection.md");
const LOCAL_EXPERT_TEMPLATE: &str = include_str!("../../prompts/local_expert.md");
const ITINERARY_TEMPLATE: &str = include_str!("../../prompts/itinerary.md");
const QUICK_CITY_TEMPLATE: &str = include_str!("../../prompts/quick_city.md");

/// One step of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub template: PromptTemplate,
    pub agent: AgentSpec,
    pub allowed_tools: Vec<String>,
    pub expected_output: String,
}

impl TaskSpec {
    /// A task whose allowed tools are the agent's tools
    pub fn new(
        name: impl Into<String>,
        template: impl Into<PromptTemplate>,
        agent: AgentSpec,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            allowed_tools: agent.tools.clone(),
            agent,
            expected_output: expected_output.into(),
        }
    }
}

/// The three-step plan: city selection, then local expert, then itinerary
pub fn trip_tasks() -> Vec<TaskSpec> {
    vec![
        TaskSpec::new(
            CITY_SELECTION,
            CITY_SELECTION_TEMPLATE,
            city_selection_expert(),
            "A detailed city selection report with:\n\
             - Recommended destination with clear reasoning\n\
             - Weather forecast and flight cost estimates\n\
             - Top attractions matching traveler interests\n\
             - Important travel considerations",
        ),
        TaskSpec::new(
            LOCAL_EXPERT,
            LOCAL_EXPERT_TEMPLATE,
            local_area_expert(),
            "A comprehensive local expert guide including:\n\
             - Hidden gems and local secrets\n\
             - Cultural insights and etiquette tips\n\
             - Authentic dining recommendations\n\
             - Activity suggestions matching interests\n\
             - Practical travel and safety information",
        ),
        TaskSpec::new(
            ITINERARY,
            ITINERARY_TEMPLATE,
            travel_concierge(),
            "A complete 7-day travel itinerary in markdown format including:\n\
             - Detailed daily schedules with specific venues and activities\n\
             - Accommodation recommendations with names and pricing\n\
             - Restaurant and dining suggestions for each meal\n\
             - Comprehensive budget breakdown with total costs\n\
             - Weather-appropriate packing list\n\
             - Transportation and logistics information",
        ),
    ]
}

/// Single simplified city recommendation
pub fn quick_tasks() -> Vec<TaskSpec> {
    vec![TaskSpec::new(
        QUICK_CITY,
        QUICK_CITY_TEMPLATE,
        quick_city_advisor(),
        "A city recommendation with brief reasoning",
    )]
}

/// Replace built-in templates with `<task name>.md` files from `loader`
pub fn apply_overrides(tasks: Vec<TaskSpec>, loader: &PromptLoader) -> Result<Vec<TaskSpec>> {
    tasks
        .into_iter()
        .map(|mut task| {
            if let Some(template) = loader.load_optional(&task.name)? {
                log::info!("Using prompt override for task {}", task.name);
                task.template = template;
            }
            Ok(task)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_trip_task_order() {
        let names: Vec<_> = trip_tasks().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec![CITY_SELECTION, LOCAL_EXPERT, ITINERARY]);
    }

    #[test]
    fn test_allowed_tools_follow_agent() {
        for task in trip_tasks() {
            assert_eq!(task.allowed_tools, task.agent.tools);
        }
    }

    #[test]
    fn test_builtin_placeholders() {
        let tasks = trip_tasks();
        assert_eq!(
            tasks[0].template.placeholders(),
            vec!["origin", "cities", "date_range", "interests"]
        );
        assert_eq!(tasks[1].template.placeholders(), vec!["date_range", "origin", "interests"]);
        assert_eq!(tasks[2].template.placeholders(), vec!["date_range", "origin", "interests"]);
        assert_eq!(
            quick_tasks()[0].template.placeholders(),
            vec!["origin", "cities", "date_range", "interests"]
        );
    }

    #[test]
    fn test_expected_output_is_dedented() {
        for task in trip_tasks() {
            assert!(task.expected_output.lines().skip(1).all(|l| l.starts_with("- ")));
        }
    }

    #[test]
    fn test_apply_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("local_expert.md"), "Guide to {{cities}} for {{interests}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let tasks = apply_overrides(trip_tasks(), &loader).unwrap();

        assert_eq!(tasks[1].template.raw(), "Guide to {{cities}} for {{interests}}");
        assert_eq!(tasks[0].template.raw(), CITY_SELECTION_TEMPLATE);
        assert_eq!(tasks[2].template.raw(), ITINERARY_TEMPLATE);
    }
}
