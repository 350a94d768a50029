//! # bpv-cli: BACnet Profile Validator CLI
//!
//! Provides the `bpv` command-line interface over the validation crates.
//!
//! ## Subcommands
//!
//! - `bpv validate`: Run every stage against one profile.
//! - `bpv batch`: Validate a directory tree or a list of files.
//! - `bpv codec`: Run a profile's codec on a single payload or its fixtures.
//! - `bpv fixtures`: Generate expected output from test data.
//! - `bpv registry`: Build or check `registry.json`.
//!
//! ```bash
//! bpv validate profiles/Acme/Acme-RS10.yaml
//! bpv batch profiles --json
//! bpv codec -f profiles/Acme/Acme-RS10.yaml -p 10 -u 040164010000000f41dc
//! bpv registry check
//! ```
//!
//! Every handler returns an exit code: 0 on success, 1 on validation
//! failure, 2 on operational error.

pub mod batch;
pub mod codec;
pub mod fixtures;
pub mod output;
pub mod registry;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpv_core::ValidatorConfig;
use bpv_schema::SchemaValidator;
use bpv_validate::ProfileValidator;

/// Exit code for a run where everything passed.
pub const EXIT_OK: u8 = 0;
/// Exit code when validation found problems.
pub const EXIT_FAILED: u8 = 1;
/// Exit code for operational errors (missing files, bad arguments).
pub const EXIT_ERROR: u8 = 2;

/// State shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Directory holding `profiles/` and `schemas/`.
    pub repo_root: PathBuf,
    pub config: ValidatorConfig,
}

impl CliContext {
    pub fn new(repo_root: PathBuf, config: ValidatorConfig) -> Self {
        Self { repo_root, config }
    }

    /// Resolve a path that may be relative to the repository root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(path, &self.repo_root)
    }

    /// A validator with the embedded schemas, or those in `schema_dir`.
    pub fn validator(&self, schema_dir: Option<&Path>) -> Result<ProfileValidator> {
        let schema = match schema_dir {
            Some(dir) => {
                let dir = self.resolve(dir);
                SchemaValidator::new(&dir)
                    .with_context(|| format!("failed to load schemas from {}", dir.display()))?
            }
            None => SchemaValidator::builtin().context("failed to compile built-in schemas")?,
        };
        Ok(ProfileValidator::new(self.config.clone(), schema))
    }
}

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `repo_root` resolves there; otherwise it stays relative to the current
/// directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

/// Walk up from `start` to the first directory containing both `schemas/`
/// and `profiles/`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schemas").is_dir() && dir.join("profiles").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Load configuration from an optional file, then the environment.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    ValidatorConfig::load(path).context("invalid configuration")
}
