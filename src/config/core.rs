use crate::export::DEFAULT_TIMESTAMP_FORMAT;
use crate::ingest::DEFAULT_MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Root configuration structure for sourcelab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkbenchConfig {
    /// Analysis server location
    #[serde(default)]
    pub server: ServerConfig,

    /// Request bounds
    #[serde(default)]
    pub transport: TransportConfig,

    /// File ingestion limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// Report output
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl WorkbenchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.transport.timeout_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.notifications.toast_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Upper bound for a single analysis or upload request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// chrono format string for the report date line
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Directory reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toast_secs: default_toast_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_toast_secs() -> u64 {
    3
}
