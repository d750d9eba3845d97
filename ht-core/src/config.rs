//! Tool configuration loaded from YAML.
//!
//! The `rules` section defaults to the dump-compat preset so that tracing a
//! recorded dataset reproduces the recorded hands out of the box; library
//! callers that want the standard ruleset use `Rules::standard()` directly.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::rules::Rules;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Rule parameters used for replay.
    #[serde(default = "Rules::dump_v1")]
    pub rules: Rules,

    /// Run execution settings.
    #[serde(default)]
    pub run: RunConfig,

    /// NDJSON logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Run execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Worker threads for per-game fan-out. 0 uses all available cores,
    /// 1 runs serially.
    #[serde(default)]
    pub jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { jobs: 0 }
    }
}

/// NDJSON logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Flush the event log every N lines (0 disables periodic flushing).
    #[serde(default = "default_flush_every_lines")]
    pub flush_every_lines: u64,
}

fn default_flush_every_lines() -> u64 {
    100
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            flush_every_lines: default_flush_every_lines(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: Rules::dump_v1(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DealOrder, RefillRule};

    #[test]
    fn test_load_default_yaml() {
        // Load the actual config file from the repo.
        let config =
            Config::load("../configs/default.yaml").expect("Failed to load configs/default.yaml");

        assert_eq!(config.rules.max_clue_tokens, 8);
        assert_eq!(config.rules.max_fuse_tokens, 3);
        assert!(!config.rules.allow_discard_at_max_clues);
        assert_eq!(config.rules.deal, DealOrder::ContiguousBlocks);
        assert_eq!(config.rules.refill, RefillRule::ShiftAndAppend);
        assert_eq!(config.run.jobs, 0);
        assert_eq!(config.logging.flush_every_lines, 100);
    }

    #[test]
    fn test_parse_yaml_string() {
        let yaml = r#"
rules:
  max_clue_tokens: 4
  deal: round_robin

run:
  jobs: 2
"#;

        let config = Config::from_yaml(yaml).expect("Failed to parse YAML");
        assert_eq!(config.rules.max_clue_tokens, 4);
        assert_eq!(config.rules.deal, DealOrder::RoundRobin);
        // Unset rule fields fall back to rule defaults, not the dump preset.
        assert_eq!(config.rules.max_fuse_tokens, 3);
        assert_eq!(config.run.jobs, 2);
        // Check defaults are applied.
        assert_eq!(config.logging.flush_every_lines, 100);
    }

    #[test]
    fn test_missing_rules_section_uses_dump_preset() {
        let config = Config::from_yaml("run:\n  jobs: 1\n").expect("parse");
        assert_eq!(config.rules, Rules::dump_v1());
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let invalid_yaml = "this is not: valid: yaml: {{{}}}";
        let result = Config::from_yaml(invalid_yaml);
        assert!(result.is_err());
    }
}
