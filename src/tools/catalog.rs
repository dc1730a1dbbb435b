//! The standard travel tool catalog
//!
//! Twelve tools: a raw web search, the calculator, and ten lookups that each
//! wrap one search query. Agents receive one of the subsets below.

use std::sync::Arc;

use super::calculator::CalculatorTool;
use super::definition::{ParamSpec, ToolSpec};
use super::lookup::{ArgFormatter, SearchLookup};
use super::registry::ToolRegistry;
use crate::error::RegistrationError;
use crate::search::SearchGateway;

pub const SEARCH: &str = "search";
pub const CALCULATOR: &str = "calculator_tool";
pub const WEATHER: &str = "weather_tool";
pub const FLIGHT: &str = "flight_tool";
pub const ACCOMMODATION: &str = "accommodation_tool";
pub const RESTAURANT: &str = "restaurant_tool";
pub const ATTRACTION: &str = "attraction_tool";
pub const HIDDEN_GEMS: &str = "hidden_gems_tool";
pub const CULTURE: &str = "culture_tool";
pub const TRANSPORTATION: &str = "transportation_tool";
pub const EVENTS: &str = "events_tool";
pub const SAFETY: &str = "safety_tool";

/// Every tool, in registration order
pub const ALL_TOOLS: &[&str] = &[
    SEARCH,
    CALCULATOR,
    WEATHER,
    FLIGHT,
    ACCOMMODATION,
    RESTAURANT,
    ATTRACTION,
    HIDDEN_GEMS,
    CULTURE,
    TRANSPORTATION,
    EVENTS,
    SAFETY,
];

pub const CITY_SELECTION_TOOLS: &[&str] = &[SEARCH, WEATHER, FLIGHT, ACCOMMODATION, EVENTS, SAFETY, CALCULATOR];

pub const LOCAL_EXPERT_TOOLS: &[&str] = &[
    SEARCH,
    ATTRACTION,
    RESTAURANT,
    HIDDEN_GEMS,
    CULTURE,
    TRANSPORTATION,
    EVENTS,
    SAFETY,
];

pub const TRAVEL_CONCIERGE_TOOLS: &[&str] = &[
    SEARCH,
    CALCULATOR,
    ACCOMMODATION,
    RESTAURANT,
    ATTRACTION,
    TRANSPORTATION,
    WEATHER,
];

const CITY: &str = "The destination city";

/// Build a registry holding all twelve tools over `gateway`
pub fn standard_registry(gateway: Arc<dyn SearchGateway>) -> Result<ToolRegistry, RegistrationError> {
    let mut registry = ToolRegistry::new();
    let lookup = |query: ArgFormatter, label: ArgFormatter, failure: &'static str| {
        SearchLookup::new(gateway.clone(), query, label, failure)
    };

    registry.register(
        ToolSpec::new(SEARCH, "Search the internet for any information.")
            .with_param(ParamSpec::required("query", "The search query")),
        lookup(
            |a| a.str("query").to_string(),
            |a| format!("Search results for '{}'", a.str("query")),
            "search failed",
        ),
    )?;

    registry.register(
        ToolSpec::new(
            CALCULATOR,
            "Useful to perform mathematical calculations for travel budgets, expenses, currency conversions, and cost estimations.",
        )
        .with_param(ParamSpec::required(
            "operation",
            "The mathematical operation to perform (e.g., \"100 * 7\", \"250 + 180\")",
        )),
        CalculatorTool,
    )?;

    registry.register(
        ToolSpec::new(
            WEATHER,
            "Get weather forecast for a specific city and date range. Useful for travel planning and packing suggestions.",
        )
        .with_param(ParamSpec::required("city", "The city name for weather forecast"))
        .with_param(ParamSpec::optional("date_range", "", "The date range for the forecast")),
        lookup(
            |a| format!("weather forecast {} {}", a.str("city"), a.str("date_range")),
            |a| format!("Weather forecast for {} during {}", a.str("city"), a.str("date_range")),
            "could not get weather forecast",
        ),
    )?;

    registry.register(
        ToolSpec::new(FLIGHT, "Search for flight prices between origin and destination cities.")
            .with_param(ParamSpec::required("origin", "Origin city/airport"))
            .with_param(ParamSpec::required("destination", "Destination city/airport"))
            .with_param(ParamSpec::required("date_range", "Travel dates")),
        lookup(
            |a| {
                format!(
                    "flights from {} to {} {} prices",
                    a.str("origin"),
                    a.str("destination"),
                    a.str("date_range")
                )
            },
            |a| {
                format!(
                    "Flight information from {} to {} for {}",
                    a.str("origin"),
                    a.str("destination"),
                    a.str("date_range")
                )
            },
            "could not search flight prices",
        ),
    )?;

    registry.register(
        ToolSpec::new(ACCOMMODATION, "Search for hotels and accommodations in a specific city.")
            .with_param(ParamSpec::required("city", CITY))
            .with_param(ParamSpec::required("date_range", "Check-in and check-out dates"))
            .with_param(ParamSpec::optional(
                "budget_range",
                "mid-range",
                "Budget preference (budget, mid-range, luxury)",
            )),
        lookup(
            |a| {
                format!(
                    "best {} hotels {} {} booking",
                    a.str("budget_range"),
                    a.str("city"),
                    a.str("date_range")
                )
            },
            |a| {
                format!(
                    "Hotel recommendations in {} for {} ({})",
                    a.str("city"),
                    a.str("date_range"),
                    a.str("budget_range")
                )
            },
            "could not search hotels",
        ),
    )?;

    registry.register(
        ToolSpec::new(RESTAURANT, "Find restaurant recommendations in a specific city.")
            .with_param(ParamSpec::required("city", CITY))
            .with_param(ParamSpec::optional(
                "cuisine_type",
                "local",
                "Type of cuisine (local, international, specific cuisine)",
            ))
            .with_param(ParamSpec::optional(
                "interests",
                "",
                "Traveler interests to match restaurant style",
            )),
        lookup(
            |a| {
                format!(
                    "best {} restaurants {} {} recommendations",
                    a.str("cuisine_type"),
                    a.str("city"),
                    a.str("interests")
                )
            },
            |a| {
                format!(
                    "Restaurant recommendations in {} for {} cuisine",
                    a.str("city"),
                    a.str("cuisine_type")
                )
            },
            "could not find restaurants",
        ),
    )?;

    registry.register(
        ToolSpec::new(ATTRACTION, "Find tourist attractions and activities in a city based on interests.")
            .with_param(ParamSpec::required("city", CITY))
            .with_param(ParamSpec::required("interests", "Traveler's interests and hobbies"))
            .with_param(ParamSpec::optional(
                "date_range",
                "",
                "Travel dates for seasonal activities",
            )),
        lookup(
            |a| {
                format!(
                    "best attractions activities {} {} {} things to do",
                    a.str("city"),
                    a.str("interests"),
                    a.str("date_range")
                )
            },
            |a| {
                format!(
                    "Attractions and activities in {} matching interests '{}'",
                    a.str("city"),
                    a.str("interests")
                )
            },
            "could not find attractions",
        ),
    )?;

    registry.register(
        ToolSpec::new(HIDDEN_GEMS, "Find hidden gems and local secrets in a city.")
            .with_param(ParamSpec::required("city", CITY))
            .with_param(ParamSpec::required("interests", "Traveler's interests")),
        lookup(
            |a| {
                format!(
                    "hidden gems secret places {} locals recommend off beaten path {}",
                    a.str("city"),
                    a.str("interests")
                )
            },
            |a| format!("Hidden gems and local secrets in {}", a.str("city")),
            "could not find hidden gems",
        ),
    )?;

    registry.register(
        ToolSpec::new(CULTURE, "Get local culture, customs, and etiquette tips for a city.")
            .with_param(ParamSpec::required("city", CITY)),
        lookup(
            |a| format!("{} local culture customs etiquette tips travelers should know", a.str("city")),
            |a| format!("Cultural tips and customs for {}", a.str("city")),
            "could not get culture tips",
        ),
    )?;

    registry.register(
        ToolSpec::new(TRANSPORTATION, "Find local transportation options and tips for a city.")
            .with_param(ParamSpec::required("city", CITY)),
        lookup(
            |a| {
                format!(
                    "{} local transportation public transport taxi uber apps getting around",
                    a.str("city")
                )
            },
            |a| format!("Local transportation options in {}", a.str("city")),
            "could not find transportation info",
        ),
    )?;

    registry.register(
        ToolSpec::new(EVENTS, "Find events, festivals, and seasonal activities in a city.")
            .with_param(ParamSpec::required("city", CITY))
            .with_param(ParamSpec::required("date_range", "Travel dates")),
        lookup(
            |a| {
                format!(
                    "{} events festivals activities {} what's happening",
                    a.str("city"),
                    a.str("date_range")
                )
            },
            |a| format!("Events and activities in {} during {}", a.str("city"), a.str("date_range")),
            "could not find events",
        ),
    )?;

    registry.register(
        ToolSpec::new(SAFETY, "Check safety information and travel advisories for a city.")
            .with_param(ParamSpec::required("city", CITY)),
        lookup(
            |a| format!("{} safety travel advisory areas to avoid crime rate tourists", a.str("city")),
            |a| format!("Safety information for {}", a.str("city")),
            "could not check safety info",
        ),
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchError;
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchGateway for Recording {
        async fn search(&self, query: &str) -> Result<String, SearchError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok("raw".to_string())
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn registry() -> (Arc<Recording>, ToolRegistry) {
        let gateway = Arc::new(Recording::default());
        let registry = standard_registry(gateway.clone()).unwrap();
        (gateway, registry)
    }

    #[test]
    fn test_registers_all_tools_in_order() {
        let (_, registry) = registry();
        assert_eq!(registry.names(), ALL_TOOLS.to_vec());
    }

    #[test]
    fn test_subsets_are_registered() {
        let (_, registry) = registry();
        for subset in [CITY_SELECTION_TOOLS, LOCAL_EXPERT_TOOLS, TRAVEL_CONCIERGE_TOOLS] {
            assert!(registry.check_names(subset).is_ok());
        }
        assert_eq!(CITY_SELECTION_TOOLS.len(), 7);
        assert_eq!(LOCAL_EXPERT_TOOLS.len(), 8);
        assert_eq!(TRAVEL_CONCIERGE_TOOLS.len(), 7);
    }

    async fn run(tool: &str, value: Value) -> (String, String) {
        let (gateway, registry) = registry();
        let result = registry.invoke(tool, &args(value)).await.unwrap();
        let query = gateway.queries.lock().unwrap().pop().unwrap_or_default();
        (query, result.label)
    }

    #[tokio::test]
    async fn test_weather_default_date_range() {
        let (query, label) = run(WEATHER, json!({ "city": "Paris" })).await;
        assert_eq!(query, "weather forecast Paris ");
        assert_eq!(label, "Weather forecast for Paris during ");
    }

    #[tokio::test]
    async fn test_queries_and_labels() {
        let cases = [
            (
                SEARCH,
                json!({ "query": "Tokyo visa" }),
                "Tokyo visa",
                "Search results for 'Tokyo visa'",
            ),
            (
                FLIGHT,
                json!({ "origin": "New York", "destination": "Paris", "date_range": "June 2024" }),
                "flights from New York to Paris June 2024 prices",
                "Flight information from New York to Paris for June 2024",
            ),
            (
                ACCOMMODATION,
                json!({ "city": "Paris", "date_range": "June 2024" }),
                "best mid-range hotels Paris June 2024 booking",
                "Hotel recommendations in Paris for June 2024 (mid-range)",
            ),
            (
                RESTAURANT,
                json!({ "city": "Tokyo", "interests": "ramen" }),
                "best local restaurants Tokyo ramen recommendations",
                "Restaurant recommendations in Tokyo for local cuisine",
            ),
            (
                ATTRACTION,
                json!({ "city": "Tokyo", "interests": "museums", "date_range": "May" }),
                "best attractions activities Tokyo museums May things to do",
                "Attractions and activities in Tokyo matching interests 'museums'",
            ),
            (
                HIDDEN_GEMS,
                json!({ "city": "Rome", "interests": "food" }),
                "hidden gems secret places Rome locals recommend off beaten path food",
                "Hidden gems and local secrets in Rome",
            ),
            (
                CULTURE,
                json!({ "city": "Kyoto" }),
                "Kyoto local culture customs etiquette tips travelers should know",
                "Cultural tips and customs for Kyoto",
            ),
            (
                TRANSPORTATION,
                json!({ "city": "Berlin" }),
                "Berlin local transportation public transport taxi uber apps getting around",
                "Local transportation options in Berlin",
            ),
            (
                EVENTS,
                json!({ "city": "Berlin", "date_range": "July" }),
                "Berlin events festivals activities July what's happening",
                "Events and activities in Berlin during July",
            ),
            (
                SAFETY,
                json!({ "city": "Rio" }),
                "Rio safety travel advisory areas to avoid crime rate tourists",
                "Safety information for Rio",
            ),
        ];

        for (tool, input, expected_query, expected_label) in cases {
            let (query, label) = run(tool, input).await;
            assert_eq!(query, expected_query, "query for {}", tool);
            assert_eq!(label, expected_label, "label for {}", tool);
        }
    }

    #[tokio::test]
    async fn test_calculator_does_not_search() {
        let (gateway, registry) = registry();
        let result = registry
            .invoke(CALCULATOR, &args(json!({ "operation": "2+2" })))
            .await
            .unwrap();
        assert_eq!(result.body, "2+2 = 4");
        assert!(gateway.queries.lock().unwrap().is_empty());
    }
}
