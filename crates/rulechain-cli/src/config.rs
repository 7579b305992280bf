//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Environment variables
//! - Command-line arguments

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use rulechain_core::GuardPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Functions rules may or may not call
    pub guard: GuardPolicy,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

/// Supported configuration file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Format for a path; unknown extensions are read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            _ => FileFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, FileFormat::from_path(path))
    }

    /// Parse configuration text in the given format
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let config = match format {
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations, then
    /// apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Get default configuration file paths to check, in priority order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".rulechain.toml"),
            PathBuf::from(".rulechain.yaml"),
            PathBuf::from(".rulechain.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let rulechain_dir = config_dir.join("rulechain");
            paths.push(rulechain_dir.join("config.toml"));
            paths.push(rulechain_dir.join("config.yaml"));
            paths.push(rulechain_dir.join("config.json"));
        }

        paths
    }

    /// Default location for the user configuration file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rulechain").join("config.toml"))
    }

    /// Apply `RULECHAIN_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(allow) = lookup("RULECHAIN_GUARD_ALLOW") {
            self.guard.allow = split_list(&allow);
        }
        if let Some(deny) = lookup("RULECHAIN_GUARD_DENY") {
            self.guard.deny = split_list(&deny);
        }
        if let Some(format) = lookup("RULECHAIN_OUTPUT_FORMAT") {
            self.output.format = parse_output_format(&format)?;
        }
        if let Some(color) = lookup("RULECHAIN_OUTPUT_COLOR") {
            self.output.color = matches!(color.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(level) = lookup("RULECHAIN_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
        Ok(())
    }

    /// Check the configuration for contradictions
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self
            .guard
            .allow
            .iter()
            .find(|name| self.guard.deny.contains(*name))
        {
            return Err(Error::config(format!(
                "Function '{}' is both allowed and denied",
                name
            )));
        }

        if let Some(format) = &self.logging.format {
            if !matches!(format.as_str(), "compact" | "full" | "json") {
                return Err(Error::config(format!("Unknown log format '{}'", format)));
            }
        }

        Ok(())
    }

    /// Serialize the configuration in the given format
    pub fn render(&self, format: FileFormat) -> Result<String> {
        let content = match format {
            FileFormat::Toml => toml::to_string_pretty(self)?,
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };
        Ok(content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(FileFormat::from_path(path))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_output_format(value: &str) -> Result<OutputFormat> {
    match value.to_lowercase().as_str() {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        "json-pretty" => Ok(OutputFormat::JsonPretty),
        "yaml" => Ok(OutputFormat::Yaml),
        other => Err(Error::config(format!("Unknown output format '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_parse_toml() {
        let config = Config::parse(
            r#"
[guard]
allow = ["trim", "titlecase"]

[output]
format = "json-pretty"
color = false

[logging]
level = "debug"
"#,
            FileFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.guard.allow, vec!["trim", "titlecase"]);
        assert!(config.guard.deny.is_empty());
        assert_eq!(config.output.format, OutputFormat::JsonPretty);
        assert!(!config.output.color);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = Config::parse("guard:\n  deny: [regex_replace]\n", FileFormat::Yaml).unwrap();
        assert_eq!(config.guard.deny, vec!["regex_replace"]);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.guard.deny = vec!["json_decode".to_string()];
        config.logging.format = Some("json".to_string());

        for name in ["config.toml", "nested/config.yaml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RULECHAIN_GUARD_ALLOW", "trim, uppercase,"),
            ("RULECHAIN_OUTPUT_FORMAT", "yaml"),
            ("RULECHAIN_OUTPUT_COLOR", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.guard.allow, vec!["trim", "uppercase"]);
        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert!(!config.output.color);

        let err = config
            .apply_env(|key| (key == "RULECHAIN_OUTPUT_FORMAT").then(|| "xml".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.guard.allow = vec!["trim".to_string()];
        config.guard.deny = vec!["trim".to_string()];
        assert!(config.validate().is_err());

        config.guard.deny.clear();
        config.logging.format = Some("fancy".to_string());
        assert!(config.validate().is_err());
    }
}
