//! Configuration - YAML settings plus the two API secrets
//!
//! Everything is resolved once at startup into a [`Config`] that is passed by
//! reference to the collaborators. Secrets come from the process environment
//! or a `.env` file; the `.env` file is read, never exported into the
//! process environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};

/// Environment variable holding the LLM provider key
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Environment variable holding the search provider key
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub crew: CrewConfig,
    pub prompts: PromptsConfig,
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.5,
            max_output_tokens: 8192,
            timeout_ms: 120_000,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub results: u32,
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            results: 10,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewConfig {
    /// Upper bound on model/tool round trips per task; 0 answers without tools
    pub max_tool_rounds: u32,
    /// Print each task's output as it completes
    pub verbose: bool,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 8,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory of `<task>.md` files overriding the built-in task templates
    pub dir: Option<PathBuf>,
}

/// API keys, never serialized
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub google_api_key: Option<String>,
    pub serper_api_key: Option<String>,
}

impl Secrets {
    /// Resolve from the process environment, falling back to `.env` entries
    pub fn resolve(env_file: Option<&Path>) -> Self {
        let file_entries = read_env_file(env_file);
        Self::resolve_with(|key| std::env::var(key).ok(), &file_entries)
    }

    /// Resolve using an arbitrary lookup, falling back to `file_entries`
    pub fn resolve_with<F>(lookup: F, file_entries: &HashMap<String, String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file_entries.get(key).filter(|v| !v.trim().is_empty()).cloned())
        };

        Self {
            google_api_key: get(GOOGLE_API_KEY),
            serper_api_key: get(SERPER_API_KEY),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("google_api_key", &self.google_api_key.as_deref().map(mask_secret))
            .field("serper_api_key", &self.serper_api_key.as_deref().map(mask_secret))
            .finish()
    }
}

/// Show a key as `first…last (N chars)` without revealing it
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();
    if len <= 12 {
        return format!("*** ({} chars)", len);
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[len - 4..].iter().collect();
    format!("{}...{} ({} chars)", head, tail, len)
}

fn read_env_file(path: Option<&Path>) -> HashMap<String, String> {
    let iter = match path {
        Some(p) => dotenvy::from_path_iter(p),
        None => dotenvy::dotenv_iter(),
    };

    match iter {
        Ok(entries) => entries
            .filter_map(|entry| match entry {
                Ok(pair) => Some(pair),
                Err(e) => {
                    log::warn!("Skipping malformed .env line: {}", e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            log::debug!("No .env file loaded: {}", e);
            HashMap::new()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            crew: CrewConfig::default(),
            prompts: PromptsConfig::default(),
            secrets: Secrets::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then resolve secrets
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_settings(config_path)?;
        config.secrets = Secrets::resolve(None);
        Ok(config)
    }

    fn load_settings(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse settings from a YAML file. Secrets are left unresolved.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            TripError::Config(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Names of the environment variables whose secrets are absent
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.secrets.google_api_key.is_none() {
            missing.push(GOOGLE_API_KEY);
        }
        if self.secrets.serper_api_key.is_none() {
            missing.push(SERPER_API_KEY);
        }
        missing
    }
}
