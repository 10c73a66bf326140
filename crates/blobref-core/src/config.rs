use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// HTTP backend settings (`[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Follow 3xx redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow when `follow_redirects` is set.
    pub max_redirections: u32,
    /// Treat non-2xx responses as errors instead of returning their body.
    pub reject_error_status: bool,
    /// Number of body chunks buffered between the transfer thread and a
    /// streaming reader.
    pub stream_buffer_chunks: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirections: 10,
            reject_error_status: false,
            stream_buffer_chunks: 16,
        }
    }
}

/// Global configuration loaded from `~/.config/blobref/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobrefConfig {
    #[serde(default)]
    pub http: HttpConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("blobref")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BlobrefConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BlobrefConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BlobrefConfig = toml::from_str(&data)?;
    Ok(cfg)
}
