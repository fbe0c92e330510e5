//! Configuration management for the expense server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the expense server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Record store configuration.
    pub store: StoreConfig,

    /// Resources domain configuration.
    pub resources: ResourcesConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Configuration for the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the persisted expense document. The document is rewritten in
    /// full on every mutation.
    pub data_file: PathBuf,
}

/// Configuration for the resources domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Path of the pre-rendered widget HTML document produced by the
    /// external asset pipeline.
    pub widget_file: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("expenses.json"),
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            widget_file: PathBuf::from("expense-widget.html"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "expense-tracker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            store: StoreConfig::default(),
            resources: ResourcesConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings are prefixed with `EXPENSE_`; the listening port is
    /// the unprefixed `PORT` (default 8787).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("EXPENSE_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("EXPENSE_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(data_file) = std::env::var("EXPENSE_DATA_FILE") {
            config.store.data_file = PathBuf::from(data_file);
        }

        if let Ok(widget_file) = std::env::var("EXPENSE_WIDGET_FILE") {
            config.resources.widget_file = PathBuf::from(widget_file);
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.name, "expense-tracker");
        assert_eq!(config.store.data_file, PathBuf::from("expenses.json"));
        assert_eq!(
            config.resources.widget_file,
            PathBuf::from("expense-widget.html")
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_data_file_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("EXPENSE_DATA_FILE", "/tmp/test-expenses.json");
        }
        let config = Config::from_env();
        assert_eq!(
            config.store.data_file,
            PathBuf::from("/tmp/test-expenses.json")
        );
        unsafe {
            std::env::remove_var("EXPENSE_DATA_FILE");
        }
    }

    #[test]
    fn test_server_name_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("EXPENSE_SERVER_NAME", "expenses-test");
        }
        let config = Config::from_env();
        assert_eq!(config.server.name, "expenses-test");
        unsafe {
            std::env::remove_var("EXPENSE_SERVER_NAME");
        }
    }
}
