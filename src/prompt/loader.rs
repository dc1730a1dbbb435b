//! Prompt Loader - Load and cache prompt template overrides from a directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;

use crate::error::{Result, TripError};

use super::template::PromptTemplate;

/// Loads and caches prompt templates (`<name>.md`) from a directory
pub struct PromptLoader {
    templates_dir: PathBuf,
    cache: RwLock<HashMap<String, PromptTemplate>>,
}

impl PromptLoader {
    /// Create a new PromptLoader with the given templates directory
    pub fn new(templates_dir: impl AsRef<Path>) -> Self {
        Self {
            templates_dir: templates_dir.as_ref().to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load a template from disk and cache it
    ///
    /// # Arguments
    /// * `name` - The template name (without .md extension)
    pub fn load(&self, name: &str) -> Result<PromptTemplate> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|e| TripError::Config(format!("Prompt cache poisoned: {}", e)))?;
            if let Some(template) = cache.get(name) {
                return Ok(template.clone());
            }
        }

        let path = self.template_path(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            TripError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to load template '{}' from {:?}: {}", name, path, e),
            ))
        })?;
        debug!("Loaded prompt override '{}' from {}", name, path.display());

        let template = PromptTemplate::new(content);
        {
            let mut cache = self
                .cache
                .write()
                .map_err(|e| TripError::Config(format!("Prompt cache poisoned: {}", e)))?;
            cache.insert(name.to_string(), template.clone());
        }

        Ok(template)
    }

    /// Load the override for `name` if one exists on disk
    pub fn load_optional(&self, name: &str) -> Result<Option<PromptTemplate>> {
        if self.exists(name) { self.load(name).map(Some) } else { Ok(None) }
    }

    /// Check if a template exists on disk
    pub fn exists(&self, name: &str) -> bool {
        self.template_path(name).exists()
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.templates_dir.join(format!("{}.md", name))
    }

    /// List all available templates in the directory, sorted
    pub fn list_available(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.templates_dir)?;

        let mut templates: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();

        templates.sort();
        Ok(templates)
    }
}
