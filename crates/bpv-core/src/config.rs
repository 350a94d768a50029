//! Validator configuration.
//!
//! Defaults suit the profile repository layout. A YAML file passed with
//! `--config` overrides the defaults, and environment variables override
//! the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings shared by the pipeline, the scanner and the codec sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ValidatorConfig {
    /// Directory names skipped at every depth when scanning for profiles.
    pub excluded_dirs: Vec<String>,
    /// Fixture directory name, relative to the profile's directory.
    pub fixtures_dir: String,
    /// Wall-clock budget for a single codec call, in milliseconds.
    pub codec_timeout_ms: u64,
    /// Interpreter loop iteration limit.
    pub loop_iteration_limit: u64,
    /// Interpreter recursion depth limit.
    pub recursion_limit: usize,
    /// Emit soft warnings for missing `units` / `updateInterval`.
    pub metadata_warnings: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: ["tests", "node_modules", ".git", "target", "templates"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fixtures_dir: "tests".to_string(),
            codec_timeout_ms: 2000,
            loop_iteration_limit: 1_000_000,
            recursion_limit: 256,
            metadata_warnings: false,
        }
    }
}

impl ValidatorConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Variables:
    /// - `BPV_EXCLUDED_DIRS` (comma list)
    /// - `BPV_FIXTURES_DIR`
    /// - `BPV_CODEC_TIMEOUT_MS`
    /// - `BPV_LOOP_LIMIT`
    /// - `BPV_RECURSION_LIMIT`
    /// - `BPV_METADATA_WARNINGS` (`true`/`false`/`1`/`0`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env(|var| std::env::var(var).ok())
    }

    /// Read a YAML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Layered load: defaults, then the optional file, then the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match config_path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let config = base.with_env(|var| std::env::var(var).ok())?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BPV_EXCLUDED_DIRS") {
            self.excluded_dirs = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(raw) = lookup("BPV_FIXTURES_DIR") {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: "BPV_FIXTURES_DIR".to_string(),
                    value: raw.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            self.fixtures_dir = raw.to_string();
        }
        if let Some(raw) = lookup("BPV_CODEC_TIMEOUT_MS") {
            self.codec_timeout_ms = parse_positive("BPV_CODEC_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("BPV_LOOP_LIMIT") {
            self.loop_iteration_limit = parse_positive("BPV_LOOP_LIMIT", &raw)?;
        }
        if let Some(raw) = lookup("BPV_RECURSION_LIMIT") {
            self.recursion_limit = parse_positive("BPV_RECURSION_LIMIT", &raw)? as usize;
        }
        if let Some(raw) = lookup("BPV_METADATA_WARNINGS") {
            self.metadata_warnings = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "BPV_METADATA_WARNINGS".to_string(),
                        value: raw,
                        reason: "expected true or false".to_string(),
                    })
                }
            };
        }
        Ok(self)
    }

    /// Fixture directory for a profile file.
    pub fn fixtures_path(&self, profile_path: &Path) -> PathBuf {
        profile_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.fixtures_dir)
    }
}

fn parse_positive(var: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().replace('_', "").parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}
