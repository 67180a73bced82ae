use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of entries shown in the suggestion popup.
const DEFAULT_MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid search config: {0}")]
    Invalid(String),
}

/// A searchable field such as `status:` or `author:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Known values, offered as suggestions after `name:`.
    #[serde(default)]
    pub values: Vec<String>,
    /// Highlight color for the field and its values (any ratatui color name or `#rrggbb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FieldConfig {
    pub fn new(name: &str, description: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            values: values.iter().map(|v| v.to_string()).collect(),
            color: None,
        }
    }
}

/// User-facing configuration of the search box, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub fields: Vec<FieldConfig>,
    pub operators: Vec<String>,
    pub separators: Vec<char>,
    pub placeholder: String,
    pub max_suggestions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldConfig::new("status", "Issue state", &["open", "closed", "merged"]),
                FieldConfig::new("author", "Who opened it", &[]),
                FieldConfig::new("label", "Attached label", &["bug", "docs", "enhancement"]),
                FieldConfig::new("is", "Item type", &["issue", "pr"]),
            ],
            operators: vec!["AND".to_string(), "OR".to_string(), "NOT".to_string()],
            separators: vec![','],
            placeholder: "Search, e.g. status:open label:bug".to_string(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl SearchConfig {
    /// `<config_dir>/token-search/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("token-search").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SearchConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing file at the default location yields the built-in config; an
    /// explicitly requested file must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            let name = field.name.as_str();
            if name.is_empty() {
                return Err(ConfigError::Invalid("field name must not be empty".into()));
            }
            if name
                .chars()
                .any(|c| c.is_whitespace() || c == ':' || c == '"' || self.separators.contains(&c))
            {
                return Err(ConfigError::Invalid(format!(
                    "field name {name:?} contains a reserved character"
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!("duplicate field {name:?}")));
            }
            if let Some(color) = &field.color {
                if color.parse::<Color>().is_err() {
                    return Err(ConfigError::Invalid(format!(
                        "field {name:?} has unknown color {color:?}"
                    )));
                }
            }
        }
        if let Some(op) = self
            .operators
            .iter()
            .find(|op| op.is_empty() || op.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::Invalid(format!("invalid operator {op:?}")));
        }
        if let Some(sep) = self
            .separators
            .iter()
            .find(|c| c.is_whitespace() || **c == '"')
        {
            return Err(ConfigError::Invalid(format!("invalid separator {sep:?}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fields": [{{"name": "owner", "values": ["me"]}}]}}"#).unwrap();

        let config = SearchConfig::load(file.path()).unwrap();
        assert_eq!(config.fields.len(), 1);
        assert_eq!(config.fields[0].name, "owner");
        assert_eq!(config.fields[0].values, vec!["me".to_string()]);
        assert_eq!(config.operators, SearchConfig::default().operators);
        assert_eq!(config.max_suggestions, DEFAULT_MAX_SUGGESTIONS);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SearchConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let mut config = SearchConfig::default();
        config.fields.push(FieldConfig::new("Status", "again", &[]));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_reserved_characters_in_field_name() {
        for name in ["", "a b", "a:b", "a,b"] {
            let mut config = SearchConfig::default();
            config.fields = vec![FieldConfig::new(name, "", &[])];
            assert!(config.validate().is_err(), "accepted {name:?}");
        }
    }

    #[test]
    fn test_rejects_unknown_color() {
        let mut config = SearchConfig::default();
        config.fields[0].color = Some("not-a-color".to_string());
        assert!(config.validate().is_err());

        config.fields[0].color = Some("#ff8800".to_string());
        assert!(config.validate().is_ok());
    }
}
