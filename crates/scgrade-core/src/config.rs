//! File configuration for scgrade.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::order::StalenessCheck;
use crate::traits::LocalizedStrings;

/// Top-level scgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScgradeConfig {
    /// Separator between rows in a response summary.
    #[serde(default = "default_delimiter")]
    pub summary_delimiter: String,
    /// How persisted orders are checked against the current rows.
    #[serde(default)]
    pub staleness_check: StalenessCheck,
    /// Max concurrent attempts in batch grading.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Human-facing literals.
    #[serde(default)]
    pub strings: LocalizedStrings,
}

fn default_delimiter() -> String {
    "; ".to_string()
}
fn default_parallelism() -> usize {
    4
}

impl Default for ScgradeConfig {
    fn default() -> Self {
        Self {
            summary_delimiter: default_delimiter(),
            staleness_check: StalenessCheck::default(),
            parallelism: default_parallelism(),
            strings: LocalizedStrings::default(),
        }
    }
}

impl ScgradeConfig {
    /// Runtime settings for a [`crate::engine::GradingEngine`].
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            summary_delimiter: self.summary_delimiter.clone(),
            staleness_check: self.staleness_check,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `scgrade.toml` in the current directory
/// 2. `~/.config/scgrade/config.toml`
///
/// Environment variable override: `SCGRADE_STALENESS_CHECK`.
pub fn load_config() -> Result<ScgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ScgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("scgrade.toml");
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
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ScgradeConfig::default(),
    };

    if let Ok(check) = std::env::var("SCGRADE_STALENESS_CHECK") {
        config.staleness_check = check
            .parse()
            .map_err(|e: String| anyhow::anyhow!("SCGRADE_STALENESS_CHECK: {e}"))?;
    }

    Ok(config)
}

/// Parse a config document and resolve `${VAR}` references in its strings.
pub fn parse_config_str(content: &str) -> Result<ScgradeConfig> {
    let mut config: ScgradeConfig = toml::from_str(content)?;
    config.strings.invalid_response = resolve_env_vars(&config.strings.invalid_response);
    config.strings.crossed_out = resolve_env_vars(&config.strings.crossed_out);
    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("scgrade"))
}
