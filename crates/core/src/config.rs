//! Configuration handling.
//!
//! Settings come from three layers in increasing precedence: built-in
//! defaults, `~/.config/tripdeck/config.toml`, and `TRIPDECK_*`
//! environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_ORGANIZER: &str = "Alex Johnson";
const DEFAULT_FETCH_DELAY_MS: i64 = 800;

/// User-tunable settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Display name attached as participant 1 on newly created trips.
    pub organizer: String,
    /// Simulated latency of the initial trip fetch, in milliseconds.
    pub fetch_delay_ms: u64,
}

impl AppConfig {
    /// Load settings from defaults, the config file, and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    fn load_from(file: Option<PathBuf>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("organizer", DEFAULT_ORGANIZER)?
            .set_default("fetch_delay_ms", DEFAULT_FETCH_DELAY_MS)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("TRIPDECK"))
            .build()
            .context("failed to load configuration")?;
        settings
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Fetch delay as a [`Duration`].
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

/// Location of the user's config file, when a config directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tripdeck").join("config.toml"))
}

/// Write a commented default config file on first launch.
pub fn ensure_default_config() -> Result<()> {
    let Some(path) = config_path() else {
        return Ok(());
    };
    write_default_config(&path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = format!(
        "# tripdeck configuration\n\
         \n\
         # Name attached as participant 1 (the organizer) on new trips.\n\
         organizer = \"{DEFAULT_ORGANIZER}\"\n\
         \n\
         # Simulated latency of the initial trip fetch, in milliseconds.\n\
         fetch_delay_ms = {DEFAULT_FETCH_DELAY_MS}\n"
    );
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_config_file() -> Result<()> {
        let config = AppConfig::load_from(None)?;
        assert_eq!(config.organizer, DEFAULT_ORGANIZER);
        assert_eq!(config.fetch_delay_ms, 800);
        assert_eq!(config.fetch_delay(), Duration::from_millis(800));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "organizer = \"Maria Garcia\"\nfetch_delay_ms = 5\n")?;

        let config = AppConfig::load_from(Some(path))?;
        assert_eq!(config.organizer, "Maria Garcia");
        assert_eq!(config.fetch_delay_ms, 5);
        Ok(())
    }

    #[test]
    fn missing_file_is_not_an_error() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(Some(dir.path().join("absent.toml")))?;
        assert_eq!(config.organizer, DEFAULT_ORGANIZER);
        Ok(())
    }

    #[test]
    fn default_config_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("tripdeck").join("config.toml");

        write_default_config(&path)?;
        let written = fs::read_to_string(&path)?;
        assert!(written.contains("organizer"));
        assert!(written.contains("fetch_delay_ms"));

        fs::write(&path, "organizer = \"Kept\"\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "organizer = \"Kept\"\n");
        Ok(())
    }
}
