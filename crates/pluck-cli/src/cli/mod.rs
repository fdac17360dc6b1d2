//! CLI for the pluck downloader.
//!
//! Flags double as environment variables so the binary can run as a CI
//! pipeline step configured purely through `PLUGIN_*` variables.

use anyhow::Result;
use clap::Parser;
use pluck_core::config;
use pluck_core::Settings;
use std::path::PathBuf;

/// Download a single file, optionally verifying its checksum.
#[derive(Debug, Parser)]
#[command(name = "pluck", version)]
#[command(about = "Download a file over HTTP(S) and verify its checksum", long_about = None)]
pub struct Cli {
    /// Source URL for the download.
    #[arg(long, env = "PLUGIN_SOURCE")]
    pub source: String,

    /// Destination file, or directory when it ends with a path separator.
    #[arg(long, env = "PLUGIN_DESTINATION")]
    pub destination: Option<String>,

    /// Value to send in the Authorization header.
    #[arg(long, env = "PLUGIN_AUTHORIZATION", hide_env_values = true)]
    pub authorization: Option<String>,

    /// Username for basic auth.
    #[arg(long, env = "PLUGIN_USERNAME")]
    pub username: Option<String>,

    /// Password for basic auth.
    #[arg(long, env = "PLUGIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Expected checksum in md5 format.
    #[arg(long = "md5-checksum", env = "PLUGIN_MD5", value_name = "HEX")]
    pub md5: Option<String>,

    /// Expected checksum in sha256 format. Checked instead of md5 when both are set.
    #[arg(long = "sha256-checksum", env = "PLUGIN_SHA256", value_name = "HEX")]
    pub sha256: Option<String>,

    /// Read transport settings from this file instead of ~/.config/pluck/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Default log filter (overridden by RUST_LOG).
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log_level: String,

    /// Log to ~/.local/state/pluck/pluck.log instead of stderr.
    #[arg(long)]
    pub log_file: bool,
}

/// Secondary environment variables, consulted when neither the flag nor the
/// primary variable is set.
const AUTHORIZATION_ALIASES: &[&str] = &["DOWNLOAD_AUTHORIZATION"];
const USERNAME_ALIASES: &[&str] = &["DOWNLOAD_USERNAME"];
const PASSWORD_ALIASES: &[&str] = &["DOWNLOAD_PASSWORD"];
const SHA256_ALIASES: &[&str] = &["PLUGIN_SHA265"];

impl Cli {
    pub fn run(&self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_default()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        let settings = self.settings();
        tracing::debug!("settings: {:?}", settings);

        let summary = pluck_core::run(&settings, &cfg.transfer_options())?;
        tracing::info!(
            destination = %summary.destination.display(),
            bytes = summary.bytes,
            "download complete"
        );
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        self.settings_with_env(|name| std::env::var(name).ok())
    }

    fn settings_with_env(&self, lookup: impl Fn(&str) -> Option<String>) -> Settings {
        let pick = |value: &Option<String>, aliases: &[&str]| -> String {
            value
                .clone()
                .or_else(|| aliases.iter().find_map(|name| lookup(name)))
                .unwrap_or_default()
        };

        Settings {
            source: self.source.clone(),
            destination: self.destination.clone().unwrap_or_default(),
            authorization: pick(&self.authorization, AUTHORIZATION_ALIASES),
            username: pick(&self.username, USERNAME_ALIASES),
            password: pick(&self.password, PASSWORD_ALIASES),
            md5: self.md5.clone().unwrap_or_default(),
            sha256: pick(&self.sha256, SHA256_ALIASES),
        }
    }
}
