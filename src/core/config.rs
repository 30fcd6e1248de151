//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,

    /// Limits and backends used by the tool handlers.
    pub tools: ToolsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory for path operations.
    /// If None, no path restrictions are enforced.
    /// All file system operations will be validated against this root.
    pub root_path: Option<PathBuf>,

    /// Whether to allow symlinks in path validation.
    /// If true, symlinks are followed and their targets are validated.
    /// If false, symlinks are rejected outright.
    pub allow_symlinks: bool,
}

/// Limits and backends for tool handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Default timeout for `proc_exec`, in seconds.
    pub exec_timeout_secs: u64,

    /// Cap on captured stdout/stderr per stream, in bytes.
    pub max_output_bytes: usize,

    /// Default cap for `fs_read_file`, in bytes.
    pub max_read_bytes: usize,

    /// Timeout for outbound HTTP requests, in seconds.
    pub http_timeout_secs: u64,

    /// SQLite file backing the `store_*` tools.
    pub store_path: PathBuf,

    /// Polling interval of filesystem watchers, in milliseconds.
    pub watch_poll_ms: u64,

    /// Events buffered per watcher before the oldest are dropped.
    pub watch_max_events: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            // No root path restriction by default
            root_path: None,
            allow_symlinks: true,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            exec_timeout_secs: 30,
            max_output_bytes: 64 * 1024,
            max_read_bytes: 1024 * 1024,
            http_timeout_secs: 30,
            store_path: PathBuf::from("toolhub-store.sqlite3"),
            watch_poll_ms: 1000,
            watch_max_events: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "toolhub-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            security: SecurityConfig::default(),
            tools: ToolsConfig::default(),
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
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`.
    /// Unparseable numeric values fall back to the default with a warning.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = timestamps.to_lowercase() != "false" && timestamps != "0";
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Load security configuration
        if let Ok(root_path) = std::env::var("MCP_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!("Path security enabled: root directory set to {:?}", config.security.root_path);
        } else {
            warn!(
                "MCP_ROOT_PATH not set - no path restrictions active. \
                 All filesystem paths will be allowed."
            );
        }

        if let Ok(allow_symlinks) = std::env::var("MCP_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = allow_symlinks.parse().unwrap_or(true);
            info!("Symlinks allowed: {}", config.security.allow_symlinks);
        }

        // Tool limits
        let tools = &mut config.tools;
        env_parse("MCP_EXEC_TIMEOUT_SECS", &mut tools.exec_timeout_secs);
        env_parse("MCP_MAX_OUTPUT_BYTES", &mut tools.max_output_bytes);
        env_parse("MCP_MAX_READ_BYTES", &mut tools.max_read_bytes);
        env_parse("MCP_HTTP_TIMEOUT_SECS", &mut tools.http_timeout_secs);
        env_parse("MCP_WATCH_POLL_MS", &mut tools.watch_poll_ms);
        env_parse("MCP_WATCH_MAX_EVENTS", &mut tools.watch_max_events);

        if let Ok(store_path) = std::env::var("MCP_STORE_PATH") {
            tools.store_path = PathBuf::from(store_path);
        }

        config
    }

    /// Check the configuration for values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = &self.security.root_path {
            if !root.is_dir() {
                return Err(Error::config(format!(
                    "MCP_ROOT_PATH {:?} is not an existing directory",
                    root
                )));
            }
        }

        let tools = &self.tools;
        for (name, value) in [
            ("exec_timeout_secs", tools.exec_timeout_secs),
            ("http_timeout_secs", tools.http_timeout_secs),
            ("watch_poll_ms", tools.watch_poll_ms),
        ] {
            if value == 0 {
                return Err(Error::config(format!("{} must be greater than zero", name)));
            }
        }
        for (name, value) in [
            ("max_output_bytes", tools.max_output_bytes),
            ("max_read_bytes", tools.max_read_bytes),
            ("watch_max_events", tools.watch_max_events),
        ] {
            if value == 0 {
                return Err(Error::config(format!("{} must be greater than zero", name)));
            }
        }

        Ok(())
    }
}

/// Overwrite `target` with the parsed value of `key`, if set and valid.
fn env_parse<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!("Ignoring {}={:?}: not a valid number", key, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_tool_limits_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_EXEC_TIMEOUT_SECS", "5");
            std::env::set_var("MCP_STORE_PATH", "/tmp/items.db");
        }
        let config = Config::from_env();
        assert_eq!(config.tools.exec_timeout_secs, 5);
        assert_eq!(config.tools.store_path, PathBuf::from("/tmp/items.db"));
        unsafe {
            std::env::remove_var("MCP_EXEC_TIMEOUT_SECS");
            std::env::remove_var("MCP_STORE_PATH");
        }
    }

    #[test]
    fn test_invalid_number_keeps_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_MAX_READ_BYTES", "lots");
        }
        let config = Config::from_env();
        assert_eq!(config.tools.max_read_bytes, ToolsConfig::default().max_read_bytes);
        unsafe {
            std::env::remove_var("MCP_MAX_READ_BYTES");
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let mut config = Config::default();
        config.security.root_path = Some(PathBuf::from("/definitely/not/here/12345"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MCP_ROOT_PATH"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.tools.exec_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
