//! Trip context - the caller-supplied record shared by every task and tool in a run

use serde::{Deserialize, Serialize};

/// What the traveler told us. Read-only for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripContext {
    /// Where the traveler departs from (e.g. "New York")
    pub origin: String,
    /// Free-text list of candidate cities (e.g. "Paris, Tokyo")
    pub cities: String,
    /// Free-text travel dates (e.g. "June 2024")
    pub date_range: String,
    /// Free-text interests (e.g. "food, museums")
    pub interests: String,
}

impl TripContext {
    pub fn new(
        origin: impl Into<String>,
        cities: impl Into<String>,
        date_range: impl Into<String>,
        interests: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            cities: cities.into(),
            date_range: date_range.into(),
            interests: interests.into(),
        }
    }

    /// Names of fields that are empty after trimming, in declaration order
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("origin", &self.origin),
            ("cities", &self.cities),
            ("date_range", &self.date_range),
            ("interests", &self.interests),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// True when every field has a value
    pub fn is_complete(&self) -> bool {
        self.blank_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_context() {
        let ctx = TripContext::new("New York", "Paris, Tokyo", "June 2024", "food, museums");
        assert!(ctx.is_complete());
        assert!(ctx.blank_fields().is_empty());
    }

    #[test]
    fn test_blank_fields_in_order() {
        let ctx = TripContext::new("  ", "Paris", "", "food");
        assert_eq!(ctx.blank_fields(), vec!["origin", "date_range"]);
        assert!(!ctx.is_complete());
    }

    #[test]
    fn test_serializes_as_template_context() {
        let ctx = TripContext::new("Lisbon", "Rome", "May", "art");
        let value = serde_json::to_value(&ctx).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(object["origin"], "Lisbon");
        assert_eq!(object["date_range"], "May");
    }
}
