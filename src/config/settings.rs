use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub narrative: NarrativeConfig,
    pub analysis: AnalysisConfig,
    pub gene_search: GeneSearchConfig,
    pub slides: SlideConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrativeConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl NarrativeConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub latency_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { latency_ms: 2500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneSearchConfig {
    pub latency_ms: u64,
    pub hotspot_count: usize,
}

impl Default for GeneSearchConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1500,
            hotspot_count: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlideConfig {
    pub samples: Vec<String>,
    pub placeholder_width: u32,
    pub placeholder_height: u32,
    /// Timeout for downloading a slide from a URL.
    pub timeout_secs: u64,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            samples: vec![
                "https://picsum.photos/seed/pathology/1024/768".to_string(),
                "https://picsum.photos/seed/tissue/1024/768".to_string(),
                "https://picsum.photos/seed/microscope/1024/768".to_string(),
            ],
            placeholder_width: 1024,
            placeholder_height: 768,
            timeout_secs: 30,
        }
    }
}

impl SlideConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.narrative.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "narrative.endpoint must not be empty".to_string(),
            ));
        }
        if self.narrative.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "narrative.model must not be empty".to_string(),
            ));
        }
        if self.narrative.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "narrative.timeout_secs must be positive".to_string(),
            ));
        }
        if self.slides.placeholder_width == 0 || self.slides.placeholder_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "slides placeholder size {}x{} must be positive",
                self.slides.placeholder_width, self.slides.placeholder_height
            )));
        }
        if self.slides.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "slides.timeout_secs must be positive".to_string(),
            ));
        }
        if let Some((index, _)) = self
            .slides
            .samples
            .iter()
            .enumerate()
            .find(|(_, sample)| sample.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "slide sample at index {index} is empty"
            )));
        }
        Ok(())
    }
}
