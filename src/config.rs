//! Configuration
//!
//! Layered: built-in defaults, then an optional `keyrun.toml` (or an
//! explicit path), then `KEYRUN_*` environment variables. Nothing here
//! is global; the loaded [`Config`] is passed to whoever needs it.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::interpreter::LoopMode;
use crate::types::RunConfig;

/// Delay schedule settings, milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DelaysConfig {
    pub initial_ms: u64,
    pub command_ms: u64,
    pub post_ms: u64,
}

impl Default for DelaysConfig {
    fn default() -> Self {
        Self {
            initial_ms: 1000,
            command_ms: 500,
            post_ms: 1000,
        }
    }
}

/// Preview settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Replay loop bodies per iteration instead of announcing once.
    pub replay_loops: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub delays: DelaysConfig,
    pub preview: PreviewConfig,
}

impl Config {
    /// Load configuration. `path` overrides the default file search.
    pub fn load(path: Option<&str>) -> Result<Config> {
        let builder = match path {
            Some(path) => config::Config::builder().add_source(config::File::with_name(path)),
            None => config::Config::builder()
                .add_source(config::File::with_name("keyrun").required(false)),
        };

        let settings = builder
            .add_source(config::Environment::with_prefix("KEYRUN").separator("__"))
            .build()
            .context("failed to load configuration")?;

        settings
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            initial_delay_ms: self.delays.initial_ms,
            command_delay_ms: self.delays.command_ms,
            post_delay_ms: self.delays.post_ms,
        }
    }

    pub fn preview_mode(&self) -> LoopMode {
        if self.preview.replay_loops {
            LoopMode::Replay
        } else {
            LoopMode::AnnounceOnce
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_settings() {
        let config = Config::default();
        assert_eq!(config.delays.initial_ms, 1000);
        assert_eq!(config.delays.command_ms, 500);
        assert_eq!(config.delays.post_ms, 1000);
        assert!(!config.preview.replay_loops);
    }

    #[test]
    fn test_run_config_mapping() {
        let config = Config::default();
        assert_eq!(config.run_config(), RunConfig::default());
    }

    #[test]
    fn test_preview_mode_flips_with_replay_loops() {
        let mut config = Config::default();
        assert_eq!(config.preview_mode(), LoopMode::AnnounceOnce);
        config.preview.replay_loops = true;
        assert_eq!(config.preview_mode(), LoopMode::Replay);
    }
}
