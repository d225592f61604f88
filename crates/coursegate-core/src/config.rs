//! coursegate configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_PASS_THRESHOLD;
use crate::service::ServiceConfig;

/// Top-level coursegate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursegateConfig {
    /// Pass threshold for quiz files that do not declare one.
    #[serde(default = "default_pass_threshold")]
    pub default_pass_threshold: f64,
    /// Refuse submissions against unpublished quizzes.
    #[serde(default = "default_true")]
    pub require_published: bool,
    /// Attempt limit for quiz files that do not declare one (0 = unlimited).
    #[serde(default)]
    pub default_max_attempts: u32,
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for CoursegateConfig {
    fn default() -> Self {
        Self {
            default_pass_threshold: default_pass_threshold(),
            require_published: true,
            default_max_attempts: 0,
        }
    }
}

impl CoursegateConfig {
    /// The attempt limit to apply when a quiz does not set one.
    pub fn default_attempt_limit(&self) -> Option<u32> {
        (self.default_max_attempts > 0).then_some(self.default_max_attempts)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            require_published: self.require_published,
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `coursegate.toml` in the current directory
/// 2. `~/.config/coursegate/config.toml`
///
/// Environment variable overrides: `COURSEGATE_PASS_THRESHOLD`,
/// `COURSEGATE_REQUIRE_PUBLISHED`.
pub fn load_config() -> Result<CoursegateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CoursegateConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("coursegate.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CoursegateConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a config TOML string.
pub fn parse_config_str(content: &str) -> Result<CoursegateConfig> {
    let config: CoursegateConfig = toml::from_str(content)?;
    anyhow::ensure!(
        (0.0..=100.0).contains(&config.default_pass_threshold),
        "default_pass_threshold must be between 0 and 100"
    );
    Ok(config)
}

fn apply_env_overrides(config: &mut CoursegateConfig) -> Result<()> {
    if let Ok(value) = std::env::var("COURSEGATE_PASS_THRESHOLD") {
        let threshold: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid COURSEGATE_PASS_THRESHOLD: '{value}'"))?;
        anyhow::ensure!(
            (0.0..=100.0).contains(&threshold),
            "COURSEGATE_PASS_THRESHOLD must be between 0 and 100"
        );
        config.default_pass_threshold = threshold;
    }

    if let Ok(value) = std::env::var("COURSEGATE_REQUIRE_PUBLISHED") {
        config.require_published = match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => anyhow::bail!("invalid COURSEGATE_REQUIRE_PUBLISHED: '{other}'"),
        };
    }

    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("coursegate"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CoursegateConfig::default();
        assert_eq!(config.default_pass_threshold, 100.0);
        assert!(config.require_published);
        assert_eq!(config.default_attempt_limit(), None);
        assert!(config.service_config().require_published);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config_str("default_pass_threshold = 70.0\n").unwrap();
        assert_eq!(config.default_pass_threshold, 70.0);
        assert!(config.require_published);

        let config = parse_config_str("default_max_attempts = 3\nrequire_published = false\n")
            .unwrap();
        assert_eq!(config.default_attempt_limit(), Some(3));
        assert!(!config.service_config().require_published);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(parse_config_str("default_pass_threshold = 150.0\n").is_err());
        assert!(parse_config_str("default_pass_threshold = \"high\"\n").is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config_from(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coursegate.toml");
        std::fs::write(&path, "default_max_attempts = 5\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_max_attempts, 5);
    }
}
