//! Shared utilities for command handlers

use crate::config::{Config, FileFormat};
use crate::error::{Error, Result};
use anyhow::Context;
use rulechain_core::{Map, RuleMap, TransformContext, Value};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read a file, or stdin for `-`
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }

    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(fs::read_to_string(path)?)
}

/// Load a data document; its top level must be a mapping
pub fn load_data(path: &Path) -> Result<Map> {
    let content = read_source(path)?;
    let format = FileFormat::from_path(path);

    let document: serde_json::Value = match format {
        FileFormat::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Yaml => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Toml => toml::from_str(&content).map_err(anyhow::Error::from),
    }
    .with_context(|| format!("Failed to parse data file {}", path.display()))?;

    match Value::from(document) {
        Value::Map(map) => Ok(map),
        _ => Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "a mapping at the top level".to_string(),
        }),
    }
}

/// Load a rule file mapping key patterns to chains
pub fn load_rules(path: &Path) -> Result<RuleMap> {
    let content = read_source(path)?;

    let rules = match FileFormat::from_path(path) {
        FileFormat::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Yaml => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
        FileFormat::Toml => toml::from_str(&content).map_err(anyhow::Error::from),
    }
    .with_context(|| format!("Failed to parse rule file {}", path.display()))?;

    Ok(rules)
}

/// Split an inline `KEY=CHAIN` rule
pub fn parse_inline_rule(rule: &str) -> Result<(String, String)> {
    match rule.split_once('=') {
        Some((key, chain)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), chain.to_string()))
        }
        _ => Err(Error::invalid_args(format!(
            "Inline rule '{}' must look like KEY=CHAIN",
            rule
        ))),
    }
}

/// Build a context over the built-in catalog, guarded by the configured
/// policy plus any command-line allow/deny lists
pub fn build_context(config: &Config, allow: &[String], deny: &[String]) -> Result<TransformContext> {
    let context = TransformContext::builder()
        .with_builtins()
        .policy(config.guard.clone())
        .allow(allow.iter().cloned())
        .deny(deny.iter().cloned())
        .build()?;

    tracing::debug!(guarded = context.is_guarded(), "Transformation context ready");
    Ok(context)
}

/// Write a serializable document, format taken from the extension
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = match FileFormat::from_path(path) {
        FileFormat::Json => serde_json::to_string_pretty(value)?,
        FileFormat::Yaml => serde_yaml::to_string(value)?,
        FileFormat::Toml => toml::to_string_pretty(value)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_load_data_formats() {
        let dir = TempDir::new().unwrap();

        let json = dir.path().join("data.json");
        fs::write(&json, r#"{"name": " jim ", "age": 3}"#).unwrap();
        let data = load_data(&json).unwrap();
        assert_eq!(data["name"], Value::from(" jim "));
        assert_eq!(data["age"], Value::Int(3));

        let yaml = dir.path().join("data.yml");
        fs::write(&yaml, "contact:\n  phone: 123-456\n").unwrap();
        let data = load_data(&yaml).unwrap();
        assert_eq!(
            data["contact"].as_map().unwrap()["phone"],
            Value::from("123-456")
        );

        let toml = dir.path().join("data.toml");
        fs::write(&toml, "name = \"jim\"\n").unwrap();
        assert_eq!(load_data(&toml).unwrap()["name"], Value::from("jim"));
    }

    #[test]
    fn test_load_data_rejects_non_mappings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_data(&path).unwrap_err(), Error::InvalidFormat { .. }));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();
        let err = load_data(&path).unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        assert!(format!("{:#}", anyhow::Error::from(err)).contains("broken.json"));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_data(&missing).unwrap_err(), Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_rules_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.yaml");
        fs::write(
            &path,
            "last_name: trim\nfirst_name:\n  - trim\n  - [replace, a, b, ':value:']\n",
        )
        .unwrap();

        let rules = load_rules(&path).unwrap();
        assert_eq!(rules.keys().collect::<Vec<_>>(), vec!["last_name", "first_name"]);
    }

    #[test]
    fn test_parse_inline_rule() {
        assert_eq!(
            parse_inline_rule("first_name=trim|ucfirst").unwrap(),
            ("first_name".to_string(), "trim|ucfirst".to_string())
        );
        assert_eq!(
            parse_inline_rule("a=default:x=y").unwrap(),
            ("a".to_string(), "default:x=y".to_string())
        );
        assert!(matches!(parse_inline_rule("trim").unwrap_err(), Error::InvalidArgs(_)));
        assert!(parse_inline_rule("=trim").is_err());
    }

    #[test]
    fn test_build_context_applies_policy() {
        let mut config = Config::default();
        config.guard.deny = vec!["uppercase".to_string()];

        let context = build_context(&config, &["trim".to_string()], &[]).unwrap();
        assert!(context.allows("trim", &Value::Null, None));
        assert!(!context.allows("uppercase", &Value::Null, None));
        assert!(!context.allows("lowercase", &Value::Null, None));

        let open = build_context(&Config::default(), &[], &[]).unwrap();
        assert!(!open.is_guarded());
    }

    #[test]
    fn test_write_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/result.yaml");
        write_document(&path, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 1\n");
    }
}
