//! Serper (Google search) gateway

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

use super::{SearchError, SearchGateway};
use crate::config::{Config, SearchConfig};

/// Web search backed by the Serper API
pub struct SerperGateway {
    client: Client,
    api_key: String,
    endpoint: String,
    results: u32,
}

impl SerperGateway {
    /// Create a gateway with an explicit API key
    pub fn new(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self, SearchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            results: config.results,
        })
    }

    /// Create a gateway from the loaded configuration and its resolved secrets
    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        let api_key = config.secrets.serper_api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        Self::new(&config.search, api_key)
    }

    /// Issue a throwaway query to verify the key and connectivity
    pub async fn ping(&self) -> Result<(), SearchError> {
        self.request("test query").await.map(|_| ())
    }

    async fn request(&self, query: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": self.results }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SearchGateway for SerperGateway {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        debug!("Serper search: {}", query);
        let body = self.request(query).await?;
        Ok(format_results(&body))
    }
}

impl std::fmt::Debug for SerperGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerperGateway")
            .field("endpoint", &self.endpoint)
            .field("results", &self.results)
            .finish()
    }
}

/// Flatten a Serper response into plain text without reordering anything
fn format_results(body: &Value) -> String {
    let mut sections = Vec::new();

    if let Some(answer) = body.get("answerBox") {
        let text = ["answer", "snippet", "title"]
            .iter()
            .find_map(|key| answer[*key].as_str())
            .unwrap_or_default();
        if !text.is_empty() {
            sections.push(format!("Answer: {}", text));
        }
    }

    if let Some(graph) = body.get("knowledgeGraph") {
        let title = graph["title"].as_str().unwrap_or_default();
        let description = graph["description"].as_str().unwrap_or_default();
        if !title.is_empty() || !description.is_empty() {
            sections.push(format!("{}: {}", title, description).trim_matches([':', ' ']).to_string());
        }
    }

    if let Some(results) = body["organic"].as_array() {
        let organic: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let title = r["title"].as_str().unwrap_or("(no title)");
                let link = r["link"].as_str().unwrap_or("");
                let snippet = r["snippet"].as_str().unwrap_or("");
                format!("{}. {}\n   {}\n   {}", i + 1, title, link, snippet)
            })
            .collect();
        if !organic.is_empty() {
            sections.push(organic.join("\n"));
        }
    }

    if sections.is_empty() {
        "No results found".to_string()
    } else {
        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config_for(server: &MockServer) -> SearchConfig {
        SearchConfig {
            endpoint: server.url("/search"),
            results: 3,
            timeout_ms: 5_000,
        }
    }

    #[test]
    fn test_format_results_organic() {
        let body = json!({
            "organic": [
                { "title": "Paris weather", "link": "https://a.example", "snippet": "Warm in June" },
                { "title": "Forecast", "link": "https://b.example", "snippet": "Sunny" }
            ]
        });
        let text = format_results(&body);
        assert_eq!(
            text,
            "1. Paris weather\n   https://a.example\n   Warm in June\n2. Forecast\n   https://b.example\n   Sunny"
        );
    }

    #[test]
    fn test_format_results_answer_and_graph() {
        let body = json!({
            "answerBox": { "answer": "22°C" },
            "knowledgeGraph": { "title": "Paris", "description": "Capital of France" },
            "organic": []
        });
        assert_eq!(format_results(&body), "Answer: 22°C\n\nParis: Capital of France");
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results(&json!({})), "No results found");
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let config = SearchConfig::default();
        assert_eq!(SerperGateway::new(&config, "  ").unwrap_err(), SearchError::MissingApiKey);
    }

    #[tokio::test]
    async fn test_search_sends_query_and_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/search")
                    .header("X-API-KEY", "serper-test")
                    .json_body(json!({ "q": "weather forecast Paris June 2024", "num": 3 }));
                then.status(200).json_body(json!({
                    "organic": [{ "title": "T", "link": "L", "snippet": "S" }]
                }));
            })
            .await;

        let gateway = SerperGateway::new(&config_for(&server), "serper-test").unwrap();
        let text = gateway.search("weather forecast Paris June 2024").await.unwrap();

        assert_eq!(text, "1. T\n   L\n   S");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/search");
                then.status(403).body("Unauthorized.");
            })
            .await;

        let gateway = SerperGateway::new(&config_for(&server), "bad-key").unwrap();
        let err = gateway.search("anything").await.unwrap_err();

        assert_eq!(
            err,
            SearchError::Api {
                status: 403,
                message: "Unauthorized.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/search").json_body(json!({ "q": "test query", "num": 3 }));
                then.status(200).json_body(json!({ "organic": [] }));
            })
            .await;

        let gateway = SerperGateway::new(&config_for(&server), "k").unwrap();
        assert!(gateway.ping().await.is_ok());
        mock.assert_async().await;
    }
}
