//! Agent personas
//!
//! An agent is static configuration: who the model should be and which
//! tools it may call.

use serde::{Deserialize, Serialize};

use crate::tools::catalog::{CITY_SELECTION_TOOLS, LOCAL_EXPERT_TOOLS, SEARCH, TRAVEL_CONCIERGE_TOOLS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Tool names this agent is permitted to call
    pub tools: Vec<String>,
}

impl AgentSpec {
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>, tools: &[&str]) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// System instruction sent with every request made on this agent's behalf
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

pub fn city_selection_expert() -> AgentSpec {
    AgentSpec::new(
        "City Selection Expert",
        "Select the best travel destination based on weather, costs, activities, and traveler preferences",
        "You are an expert travel analyst with years of experience in destination research. \
         You excel at comparing multiple cities across various factors like weather patterns, flight costs, \
         accommodation availability, and seasonal events. You always provide data-driven recommendations \
         that match the traveler's interests and budget.",
        CITY_SELECTION_TOOLS,
    )
}

pub fn local_area_expert() -> AgentSpec {
    AgentSpec::new(
        "Local Area Expert",
        "Provide insider knowledge and local recommendations for the selected destination",
        "You are a local expert who has lived in cities around the world and knows them \
         like a native. You have insider knowledge of hidden gems, local customs, authentic restaurants, \
         and the best ways to experience a destination like a local rather than a tourist. You provide \
         practical, actionable advice that helps travelers have authentic experiences.",
        LOCAL_EXPERT_TOOLS,
    )
}

pub fn travel_concierge() -> AgentSpec {
    AgentSpec::new(
        "Travel Concierge",
        "Create detailed, practical travel itineraries with accommodations, dining, and budget planning",
        "You are a professional travel concierge with expertise in creating comprehensive \
         travel itineraries. You excel at logistics, timing, and creating seamless travel experiences. \
         You know how to balance must-see attractions with rest time, find the best accommodations, \
         and create realistic budgets. You always consider practical details like transportation, \
         weather, and local events.",
        TRAVEL_CONCIERGE_TOOLS,
    )
}

/// Lightweight advisor used by `plan --quick`, limited to raw search
pub fn quick_city_advisor() -> AgentSpec {
    AgentSpec::new(
        "City Selection Expert",
        "Help select the best travel destination",
        "You are an expert travel advisor who helps people choose destinations.",
        &[SEARCH],
    )
}
