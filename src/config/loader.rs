//! Configuration overlay loading from YAML or JSON files.
//!
//! An overlay is a partial configuration tree that is deep-merged over the
//! built-in defaults. When `ACCESSIFY_ENV` (or `APP_ENV`) names an
//! environment, a sibling `<stem>.<env>.<ext>` file is merged on top of the
//! base overlay if it exists.

use super::error::{ConfigResult, ConfigurationError};
use super::merge::deep_merge;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Current environment from environment variables
pub fn current_environment() -> Option<String> {
    std::env::var("ACCESSIFY_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok()
        .filter(|env| !env.is_empty())
}

/// Parse an overlay from a string
pub fn parse_overrides(contents: &str, format: ConfigFormat, origin: &str) -> ConfigResult<Value> {
    let value: Value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents)
            .map_err(|e| ConfigurationError::invalid_yaml(origin, e))?,
        ConfigFormat::Json => serde_json::from_str(contents)
            .map_err(|e| ConfigurationError::invalid_json(origin, e))?,
    };

    match value {
        Value::Object(_) => Ok(value),
        // An empty YAML document parses as null
        Value::Null => Ok(Value::Object(Default::default())),
        _ => Err(ConfigurationError::invalid_overlay(origin)),
    }
}

/// Load one overlay file
pub fn load_file<P: AsRef<Path>>(path: P) -> ConfigResult<Value> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        ConfigurationError::UnsupportedFormat {
            file_path: origin.clone(),
        }
    })?;

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigurationError::file_read_error(&origin, e))?;
    debug!(file = %origin, "Read configuration overlay");

    parse_overrides(&contents, format, &origin)
}

/// Load an overlay plus its environment-specific sibling, if any
pub fn load_overrides<P: AsRef<Path>>(path: P) -> ConfigResult<Value> {
    let path = path.as_ref();
    let mut overrides = load_file(path)?;

    if let Some(environment) = current_environment() {
        if let Some(env_path) = environment_path(path, &environment) {
            if env_path.exists() {
                deep_merge(&mut overrides, load_file(&env_path)?);
                info!(
                    environment = %environment,
                    file = %env_path.display(),
                    "Applied environment configuration overlay"
                );
            }
        }
    }

    Ok(overrides)
}

/// `settings.yaml` + `production` → `settings.production.yaml`
fn environment_path(path: &Path, environment: &str) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let extension = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.{environment}.{extension}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_overlay() {
        let overlay = parse_overrides(
            "language: fr\nvisual:\n  textSize:\n    current: 1.5\n",
            ConfigFormat::Yaml,
            "inline",
        )
        .unwrap();

        assert_eq!(
            overlay,
            json!({ "language": "fr", "visual": { "textSize": { "current": 1.5 } } })
        );
    }

    #[test]
    fn test_empty_yaml_is_empty_overlay() {
        let overlay = parse_overrides("", ConfigFormat::Yaml, "inline").unwrap();
        assert_eq!(overlay, json!({}));
    }

    #[test]
    fn test_non_mapping_overlay_is_rejected() {
        let err = parse_overrides("[1, 2]", ConfigFormat::Json, "inline").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidOverlay { .. }));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/b.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("b.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("b.toml")), None);
    }

    #[test]
    fn test_environment_path() {
        assert_eq!(
            environment_path(Path::new("conf/accessify.yaml"), "test"),
            Some(PathBuf::from("conf/accessify.test.yaml"))
        );
    }
}
