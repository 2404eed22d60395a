// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address, all interfaces by default
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory requests are resolved against
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Tokio worker threads (CPU cores when unset, must not be 0)
    #[serde(default)]
    pub workers: Option<usize>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8888
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root: default_root(),
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// One line per handled request
    #[serde(default = "default_access_log")]
    pub access_log: bool,
    /// Access log format (common, combined, json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stderr if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

const fn default_access_log() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: default_access_log(),
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Keep connections open between requests (off: one request per connection)
    #[serde(default)]
    pub keep_alive: bool,
    /// Seconds a client may take to send a request head; bodies are unbounded
    #[serde(default = "default_header_read_timeout")]
    pub header_read_timeout: u64,
}

fn default_server_name() -> String {
    format!("devserve/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_header_read_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            keep_alive: false,
            header_read_timeout: default_header_read_timeout(),
        }
    }
}
