//! Front-end configuration, read from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding in-progress wizard state.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    Http,
    #[default]
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    /// Base URL of the hosted database, for `kind = "http"`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            url: None,
            table: default_table(),
            api_key_env: default_api_key_env(),
            csv_path: default_csv_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file: default_log_file() }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("wizard-progress.json")
}

fn default_table() -> String {
    "contact_submissions".to_string()
}

fn default_api_key_env() -> String {
    "DEALER_WIZARD_API_KEY".to_string()
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("leads.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("dealer-wizard.log")
}

impl Config {
    /// Loads `path`, or the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink.kind == SinkKind::Http && self.sink.url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Validation("sink.kind = \"http\" requires sink.url".to_string()));
        }
        if self.sink.table.trim().is_empty() {
            return Err(ConfigError::Validation("sink.table must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sink.kind, SinkKind::Csv);
        assert_eq!(config.sink.table, "contact_submissions");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_http_sink_section() {
        let config = Config::from_toml(
            r#"
            [sink]
            kind = "http"
            url = "https://db.example.com"
            api_key_env = "DB_KEY"

            [store]
            path = "/tmp/progress.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.sink.kind, SinkKind::Http);
        assert_eq!(config.sink.url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.sink.api_key_env, "DB_KEY");
        assert_eq!(config.store.path, PathBuf::from("/tmp/progress.json"));
    }

    #[test]
    fn test_http_sink_requires_url() {
        let err = Config::from_toml("[sink]\nkind = \"http\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_sink_kind_is_parse_error() {
        let err = Config::from_toml("[sink]\nkind = \"carrier-pigeon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
