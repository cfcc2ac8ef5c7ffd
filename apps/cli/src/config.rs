//! Client configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/chunkup/client.toml`
//! - Windows: `%APPDATA%/chunkup/client.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use chunkup_protocol::Endpoints;
use chunkup_protocol::constants::UPLOAD_FILE_PATH;
use chunkup_transfer::DEFAULT_MAX_FILE_SIZE;
use serde::{Deserialize, Serialize};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the upload endpoints hang off.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Largest file accepted for upload, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Per-chunk request timeout. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_timeout_secs: Option<u64>,

    /// Path of the one-shot multipart endpoint, relative to `server_url`.
    #[serde(default = "default_simple_upload_path")]
    pub simple_upload_path: String,
}

fn default_server_url() -> String {
    "http://localhost:9000/file".into()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_simple_upload_path() -> String {
    UPLOAD_FILE_PATH.into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            max_file_size: default_max_file_size(),
            chunk_timeout_secs: None,
            simple_upload_path: default_simple_upload_path(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `path` (or the platform default), creating
    /// a default file if none exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: ClientConfig = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            let config = ClientConfig::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::with_simple_path(&self.server_url, &self.simple_upload_path)
    }

    pub fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout_secs.map(Duration::from_secs)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("chunkup")
            .join("client.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("chunkup").join("client.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/chunkup/client.toml"))
    }
}
