use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::fetch::{TransferOptions, MAX_TIMEOUT};

/// Transport configuration loaded from `~/.config/pluck/config.toml`.
/// Missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluckConfig {
    /// Overall request timeout in seconds, across all redirect hops.
    pub timeout_secs: u64,
    /// Per-hop connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum number of redirects followed before giving up.
    pub max_redirects: usize,
    /// Optional User-Agent header; libcurl's default when unset.
    pub user_agent: Option<String>,
}

impl Default for PluckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            connect_timeout_secs: 30,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

impl PluckConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs must be greater than zero");
        }
        let max = MAX_TIMEOUT.as_secs();
        if self.timeout_secs > max {
            anyhow::bail!("timeout_secs must be at most {}", max);
        }
        if self.connect_timeout_secs > max {
            anyhow::bail!("connect_timeout_secs must be at most {}", max);
        }
        Ok(())
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Load configuration from the XDG config directory, or defaults if no file exists.
/// No file is created.
pub fn load_default() -> Result<PluckConfig> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pluck")?;
    match xdg_dirs.find_config_file("config.toml") {
        Some(path) => load_from(&path),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(PluckConfig::default())
        }
    }
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from(path: &Path) -> Result<PluckConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: PluckConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
