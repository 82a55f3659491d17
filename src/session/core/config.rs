//! Configuration for the whiteboard service.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::core::errors::{SessionError, SessionResult};

/// Environment variable overriding the HTTP port.
pub const PORT_ENV: &str = "WHITEBOARD_PORT";
/// Environment variable selecting the storage backend.
pub const STORAGE_ENV: &str = "WHITEBOARD_STORAGE";
/// Environment variable overriding the `SQLite` path.
pub const DB_ENV: &str = "WHITEBOARD_DB";
/// Environment variable overriding the summary interval.
pub const SUMMARY_INTERVAL_ENV: &str = "WHITEBOARD_SUMMARY_INTERVAL";
/// Environment variable selecting the summary mode.
pub const SUMMARY_MODE_ENV: &str = "WHITEBOARD_SUMMARY_MODE";
/// Environment variable overriding the completion model.
pub const LLM_MODEL_ENV: &str = "WHITEBOARD_LLM_MODEL";
/// Environment variable overriding the completion endpoint.
pub const LLM_URL_ENV: &str = "WHITEBOARD_LLM_URL";
/// Environment variable overriding the completion timeout.
pub const LLM_TIMEOUT_ENV: &str = "WHITEBOARD_LLM_TIMEOUT_SECS";

/// Top-level configuration for the whiteboard service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WhiteboardConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Summary settings.
    pub summary: SummaryConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
}

impl WhiteboardConfig {
    /// Build a configuration from defaults overlaid with `WHITEBOARD_*` variables.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparsable value or the
    /// result fails validation.
    pub fn from_env() -> SessionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration using `lookup` as the variable source.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparsable value or the
    /// result fails validation.
    pub fn from_lookup<F>(lookup: F) -> SessionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup(PORT_ENV) {
            config.server.port = parse_var(PORT_ENV, &port)?;
        }
        if let Some(backend) = lookup(STORAGE_ENV) {
            config.storage.backend = match backend.as_str() {
                "sqlite" => StorageBackend::Sqlite,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(SessionError::InvalidConfig(format!(
                        "{STORAGE_ENV} must be `sqlite` or `memory`, got `{other}`"
                    )));
                }
            };
        }
        if let Some(path) = lookup(DB_ENV) {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Some(interval) = lookup(SUMMARY_INTERVAL_ENV) {
            config.summary.interval = parse_var(SUMMARY_INTERVAL_ENV, &interval)?;
        }
        if let Some(mode) = lookup(SUMMARY_MODE_ENV) {
            config.summary.mode = match mode.as_str() {
                "transcript" => SummaryMode::Transcript,
                "llm" => SummaryMode::Llm,
                other => {
                    return Err(SessionError::InvalidConfig(format!(
                        "{SUMMARY_MODE_ENV} must be `transcript` or `llm`, got `{other}`"
                    )));
                }
            };
        }
        if let Some(model) = lookup(LLM_MODEL_ENV) {
            config.llm.model = model;
        }
        if let Some(base_url) = lookup(LLM_URL_ENV) {
            config.llm.base_url = Some(base_url);
        }
        if let Some(timeout) = lookup(LLM_TIMEOUT_ENV) {
            config.llm.timeout_secs = parse_var(LLM_TIMEOUT_ENV, &timeout)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> SessionResult<()> {
        if self.summary.interval == 0 {
            return Err(SessionError::InvalidConfig(
                "summary.interval must be > 0".to_string(),
            ));
        }

        if self.summary.max_input_chars == 0 {
            return Err(SessionError::InvalidConfig(
                "summary.max_input_chars must be > 0".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(SessionError::InvalidConfig(
                "llm.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.storage.kv_table.is_empty()
            || !self
                .storage
                .kv_table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(SessionError::InvalidConfig(
                "storage.kv_table must be a plain identifier".to_string(),
            ));
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> SessionResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SessionError::InvalidConfig(format!("{name} has invalid value `{value}`")))
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Which store implementation backs the session logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Durable `SQLite` key-value table.
    #[default]
    Sqlite,
    /// Process-local map, lost on restart.
    Memory,
}

/// Storage configuration for session data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Key-value table name.
    pub kv_table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            sqlite_path: PathBuf::from("whiteboard.sqlite"),
            kv_table: "whiteboard_kv".to_string(),
        }
    }
}

/// Summarization strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// Plain transcript concatenation (no LLM).
    #[default]
    Transcript,
    /// Delegate to the configured completion model.
    Llm,
}

/// Summary settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Regenerate whenever the log length is a multiple of this.
    pub interval: usize,
    /// Selected strategy.
    pub mode: SummaryMode,
    /// Max transcript size sent to the model, in characters.
    pub max_input_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            interval: 3,
            mode: SummaryMode::Transcript,
            max_input_chars: 8000,
        }
    }
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// Upper bound on a single completion call.
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Completion timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "ministral-3:8b-instruct-2512-q8_0".to_string(),
            temperature: 0.3,
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = WhiteboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.summary.interval, 3);
        assert_eq!(config.summary.mode, SummaryMode::Transcript);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let config = WhiteboardConfig::from_lookup(lookup_from(&[
            (PORT_ENV, "8080"),
            (STORAGE_ENV, "memory"),
            (SUMMARY_MODE_ENV, "llm"),
            (LLM_URL_ENV, "http://127.0.0.1:11434"),
            (LLM_TIMEOUT_ENV, "5"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.summary.mode, SummaryMode::Llm);
        assert_eq!(config.llm.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = WhiteboardConfig::from_lookup(lookup_from(&[(SUMMARY_INTERVAL_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_url_rejected() {
        let err =
            WhiteboardConfig::from_lookup(lookup_from(&[(LLM_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, SessionError::Url(_)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err =
            WhiteboardConfig::from_lookup(lookup_from(&[(STORAGE_ENV, "redis")])).unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig(_)));
    }

    #[test]
    fn test_table_name_must_be_identifier() {
        let mut config = WhiteboardConfig::default();
        config.storage.kv_table = "kv; DROP TABLE x".to_string();
        assert!(config.validate().is_err());
    }
}
