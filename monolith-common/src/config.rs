//! Configuration types for the monolith service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonolithConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Where write operations put their log files
    #[serde(default)]
    pub storage: StorageConfig,

    /// Static file mounts
    #[serde(default = "default_static_files")]
    pub static_files: Vec<StaticFileConfig>,
}

impl Default for MonolithConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            static_files: default_static_files(),
        }
    }
}

/// Server listening configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Volume storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory that receives one text file per write operation
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
        }
    }
}

/// Static file serving configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFileConfig {
    /// URL path prefix
    pub path: String,

    /// Root directory for static files
    pub root: PathBuf,

    /// Index file name
    #[serde(default = "default_index")]
    pub index: String,

    /// Render an HTML listing for directories without an index file
    #[serde(default)]
    pub directory_listing: bool,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./data/log")
}

fn default_index() -> String {
    "index.html".to_string()
}

fn default_static_files() -> Vec<StaticFileConfig> {
    vec![StaticFileConfig {
        path: "/".to_string(),
        root: PathBuf::from("./static"),
        index: default_index(),
        directory_listing: false,
    }]
}

impl MonolithConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// `host:port` string the listener binds to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
