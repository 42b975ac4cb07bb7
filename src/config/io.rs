use std::fs;
use std::path::Path;

use super::{AppConfig, Result};

fn is_yaml(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(extension.as_str(), "yaml" | "yml")
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let config = if is_yaml(path) {
        serde_yaml::from_str::<AppConfig>(&raw)?
    } else {
        serde_json::from_str::<AppConfig>(&raw)?
    };
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: impl AsRef<Path>, config: &AppConfig) -> Result<()> {
    let path = path.as_ref();
    let serialized = if is_yaml(path) {
        serde_yaml::to_string(config)?
    } else {
        serde_json::to_string_pretty(config)?
    };
    fs::write(path, serialized)?;
    Ok(())
}

/// Loads `path` when given, otherwise the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    }
}
