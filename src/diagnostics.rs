//! Setup diagnostics - connectivity and API key checks behind `tripcrew diagnose`
//!
//! Each check produces a [`CheckOutcome`] rather than an error so the report
//! always covers every check.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;

use crate::config::{Config, GOOGLE_API_KEY, SERPER_API_KEY, mask_secret};
use crate::llm::{CompletionRequest, GeminiClient, LlmClient};
use crate::search::SerperGateway;

pub const INTERNET: &str = "Internet Connection";
pub const GOOGLE: &str = "Google API Key";
pub const SERPER: &str = "Serper API Key";

/// Keys shorter than this are almost certainly truncated
pub const MIN_GOOGLE_KEY_LEN: usize = 30;

const DEFAULT_CONNECTIVITY_URL: &str = "https://www.google.com";
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    /// Human-readable findings, in the order they were made
    pub details: Vec<String>,
}

impl CheckOutcome {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            passed: false,
            details: Vec::new(),
        }
    }

    fn note(&mut self, detail: impl Into<String>) {
        self.details.push(detail.into());
    }

    fn pass(mut self, detail: impl Into<String>) -> Self {
        self.note(detail);
        self.passed = true;
        self
    }

    fn fail(mut self, detail: impl Into<String>) -> Self {
        self.note(detail);
        self.passed = false;
        warn!("Diagnostic '{}' failed: {}", self.name, self.details.join("; "));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub checks: Vec<CheckOutcome>,
}

impl DiagnosticReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn passed(&self, name: &str) -> bool {
        self.checks.iter().any(|c| c.name == name && c.passed)
    }

    /// Remediation steps for each failed check
    pub fn hints(&self) -> Vec<(&'static str, Vec<String>)> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| (c.name, remediation(c.name)))
            .collect()
    }
}

fn remediation(name: &str) -> Vec<String> {
    match name {
        INTERNET => vec!["Check your internet connection".to_string()],
        GOOGLE => vec![
            "Go to https://console.cloud.google.com/".to_string(),
            "Enable the Generative AI API".to_string(),
            "Create an API key".to_string(),
            format!("Add it to your .env file as {}=your_key_here", GOOGLE_API_KEY),
        ],
        SERPER => vec![
            "Go to https://serper.dev/".to_string(),
            "Sign up and get an API key".to_string(),
            format!("Add it to your .env file as {}=your_key_here", SERPER_API_KEY),
        ],
        _ => Vec::new(),
    }
}

/// Runs the setup checks against a loaded configuration
pub struct Diagnostics<'a> {
    config: &'a Config,
    connectivity_url: String,
}

impl<'a> Diagnostics<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            connectivity_url: DEFAULT_CONNECTIVITY_URL.to_string(),
        }
    }

    /// Probe a different URL for the connectivity check
    pub fn with_connectivity_url(mut self, url: impl Into<String>) -> Self {
        self.connectivity_url = url.into();
        self
    }

    /// Run every check in order
    pub async fn run(&self) -> DiagnosticReport {
        DiagnosticReport {
            checks: vec![
                self.check_internet().await,
                self.check_google().await,
                self.check_serper().await,
            ],
        }
    }

    pub async fn check_internet(&self) -> CheckOutcome {
        let outcome = CheckOutcome::new(INTERNET);
        let client = match Client::builder().timeout(CONNECTIVITY_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => return outcome.fail(format!("Could not create HTTP client: {}", e)),
        };

        debug!("Connectivity probe: {}", self.connectivity_url);
        match client.get(&self.connectivity_url).send().await {
            Ok(response) if response.status().is_success() => outcome.pass("Internet connection: OK"),
            Ok(response) => outcome.fail(format!("Internet connection issue: status {}", response.status().as_u16())),
            Err(e) => outcome.fail(format!("Internet connection failed: {}", e)),
        }
    }

    pub async fn check_google(&self) -> CheckOutcome {
        let mut outcome = CheckOutcome::new(GOOGLE);
        let Some(key) = self.config.secrets.google_api_key.as_deref() else {
            return outcome.fail(format!("{} not found in environment or .env", GOOGLE_API_KEY));
        };

        let len = key.chars().count();
        if len < MIN_GOOGLE_KEY_LEN {
            return outcome.fail(format!("API key seems too short: {} characters", len));
        }
        outcome.note(format!("API key found: {}", mask_secret(key)));

        let client = match GeminiClient::new(&self.config.llm, key) {
            Ok(client) => client,
            Err(e) => return outcome.fail(format!("Google API test failed: {}", e)),
        };
        let request = CompletionRequest::new("")
            .with_user_message("Hello, respond with just 'API Working'")
            .with_temperature(0.1)
            .with_max_tokens(16);

        match client.complete(request).await {
            Ok(response) => outcome.pass(format!("Google API test successful: {}", response.content.trim())),
            Err(e) => outcome.fail(format!("Google API test failed: {}", e)),
        }
    }

    pub async fn check_serper(&self) -> CheckOutcome {
        let mut outcome = CheckOutcome::new(SERPER);
        let Some(key) = self.config.secrets.serper_api_key.as_deref() else {
            return outcome.fail(format!("{} not found in environment or .env", SERPER_API_KEY));
        };
        outcome.note(format!("Serper API key found: {}", mask_secret(key)));

        let gateway = match SerperGateway::new(&self.config.search, key) {
            Ok(gateway) => gateway,
            Err(e) => return outcome.fail(format!("Serper API test failed: {}", e)),
        };

        match gateway.ping().await {
            Ok(()) => outcome.pass("Serper API test successful"),
            Err(e) => outcome.fail(format!("Serper API test failed: {}", e)),
        }
    }
}
