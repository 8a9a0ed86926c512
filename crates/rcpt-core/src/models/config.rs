//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Object store configuration.
    pub storage: StorageConfig,

    /// OCR service configuration.
    pub ocr: OcrConfig,

    /// Receipt persistence configuration.
    pub persistence: PersistenceConfig,

    /// Email notification configuration.
    pub notification: NotificationConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Object store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory; each bucket is a subdirectory.
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/buckets"),
        }
    }
}

/// Which OCR backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// Replay saved AnalyzeExpense responses from disk.
    #[default]
    Recorded,
    /// Call an AnalyzeExpense-compatible HTTP endpoint.
    Http,
}

/// OCR service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Backend selection.
    pub backend: OcrBackend,

    /// Directory of recorded responses (`recorded` backend).
    pub responses_dir: PathBuf,

    /// Service endpoint URL (`http` backend).
    pub endpoint: String,

    /// Request timeout in seconds (`http` backend).
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Recorded,
            responses_dir: PathBuf::from("data/ocr"),
            endpoint: "http://localhost:4566".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Receipt persistence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Directory holding the tables.
    pub table_dir: PathBuf,

    /// Table name; receipts live under `table_dir/table_name`.
    pub table_name: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            table_dir: PathBuf::from("data/tables"),
            table_name: "Receipts".to_string(),
        }
    }
}

impl PersistenceConfig {
    /// Directory of the configured table.
    pub fn table_path(&self) -> PathBuf {
        self.table_dir.join(&self.table_name)
    }
}

/// Email notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Send a notification after each stored receipt.
    pub enabled: bool,

    /// Sender address.
    pub sender_email: String,

    /// Recipient address.
    pub recipient_email: String,

    /// Directory that receives outgoing messages.
    pub outbox_dir: PathBuf,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender_email: "your-email@example.com".to_string(),
            recipient_email: "recipient@example.com".to_string(),
            outbox_dir: PathBuf::from("data/outbox"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when neither `-v` nor `LOG_LEVEL` is given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level, or `None` when it names no known level.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        LevelFilter::from_str(&normalize_level(&self.level)).ok()
    }
}

/// Map a level name to its tracing spelling. `WARNING`, `CRITICAL` and
/// `FATAL` are accepted for compatibility with Python-style deployments.
pub fn normalize_level(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Recognized variables: `DYNAMODB_TABLE`, `SES_SENDER_EMAIL`,
    /// `SES_RECIPIENT_EMAIL`, `LOG_LEVEL`, `RCPT_STORAGE_ROOT`,
    /// `RCPT_OCR_ENDPOINT`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(table) = lookup("DYNAMODB_TABLE") {
            self.persistence.table_name = table;
        }
        if let Some(sender) = lookup("SES_SENDER_EMAIL") {
            self.notification.sender_email = sender;
        }
        if let Some(recipient) = lookup("SES_RECIPIENT_EMAIL") {
            self.notification.recipient_email = recipient;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = normalize_level(&level);
        }
        if let Some(root) = lookup("RCPT_STORAGE_ROOT") {
            self.storage.root = PathBuf::from(root);
        }
        if let Some(endpoint) = lookup("RCPT_OCR_ENDPOINT") {
            self.ocr.backend = OcrBackend::Http;
            self.ocr.endpoint = endpoint;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: RcptConfig =
            serde_json::from_str(r#"{"persistence": {"table_name": "Expenses"}}"#).unwrap();

        assert_eq!(config.persistence.table_name, "Expenses");
        assert_eq!(config.persistence.table_dir, PathBuf::from("data/tables"));
        assert_eq!(config.ocr.backend, OcrBackend::Recorded);
        assert!(config.notification.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DYNAMODB_TABLE", "Prod"),
            ("SES_RECIPIENT_EMAIL", "ops@example.com"),
            ("LOG_LEVEL", "DEBUG"),
            ("RCPT_OCR_ENDPOINT", "http://ocr.internal:8080"),
        ]
        .into_iter()
        .collect();

        let config = RcptConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.persistence.table_name, "Prod");
        assert_eq!(config.notification.recipient_email, "ops@example.com");
        assert_eq!(config.notification.sender_email, "your-email@example.com");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.ocr.backend, OcrBackend::Http);
        assert_eq!(config.ocr.endpoint, "http://ocr.internal:8080");
    }

    #[test]
    fn test_python_level_names() {
        let config = RcptConfig::default()
            .with_overrides(|name| (name == "LOG_LEVEL").then(|| "WARNING".to_string()));

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.level_filter(), Some(LevelFilter::WARN));

        let critical = LoggingConfig {
            level: "CRITICAL".to_string(),
        };
        assert_eq!(critical.level_filter(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let config = LoggingConfig {
            level: "verbose".to_string(),
        };
        assert_eq!(config.level_filter(), None);

        let default = LoggingConfig::default();
        assert_eq!(default.level_filter(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = RcptConfig::default();
        config.storage.root = PathBuf::from("/srv/receipts");
        config.save(&path).unwrap();

        assert_eq!(RcptConfig::from_file(&path).unwrap(), config);
    }
}
