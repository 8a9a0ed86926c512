//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;
pub mod query;
pub mod show;

use std::path::{Path, PathBuf};

use rcpt_core::models::config::RcptConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// Load configuration from `path`, or the default file if it exists, then
/// apply environment overrides.
pub fn load_config(path: Option<&str>) -> anyhow::Result<RcptConfig> {
    let config = match path {
        Some(path) => RcptConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                RcptConfig::from_file(&default_path)?
            } else {
                RcptConfig::default()
            }
        }
    };

    Ok(config.with_env_overrides())
}
