//! # Profile Discovery
//!
//! A scan is an explicit [`ScanConfig`] passed to [`scan_profiles`]; nothing
//! here reads the current directory implicitly. Unreadable directories are
//! logged and skipped so one bad folder does not hide the rest of the tree.

use std::path::{Path, PathBuf};

use bpv_core::ValidatorConfig;

use crate::error::{Result, ValidateError};

/// How deep a scan descends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Every subdirectory, at any depth.
    #[default]
    Recursive,
    /// `<root>/<Vendor>/*.yaml` only.
    OneLevel,
}

/// Where and how to look for profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub root: PathBuf,
    /// Directory names skipped wherever they appear.
    pub excluded_dirs: Vec<String>,
    pub mode: ScanMode,
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>, config: &ValidatorConfig) -> Self {
        Self {
            root: root.into(),
            excluded_dirs: config.excluded_dirs.clone(),
            mode: ScanMode::Recursive,
        }
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.excluded_dirs.iter().any(|x| x == n))
    }
}

/// True for `.yaml` and `.yml` files.
pub fn is_profile_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Find profile files under `config.root`, sorted.
pub fn scan_profiles(config: &ScanConfig) -> Vec<PathBuf> {
    let mut found = Vec::new();
    match config.mode {
        ScanMode::Recursive => walk(&config.root, config, usize::MAX, &mut found),
        ScanMode::OneLevel => walk(&config.root, config, 1, &mut found),
    }
    found.sort();
    tracing::debug!(root = %config.root.display(), count = found.len(), "scanned for profiles");
    found
}

/// Collect profiles in `dir`, descending at most `depth` more levels.
///
/// With `OneLevel` the root itself contributes no files: profiles sit in
/// vendor folders.
fn walk(dir: &Path, config: &ScanConfig, depth: usize, acc: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "failed to read directory during profile scan"
            );
            return;
        }
    };
    let at_root = dir == config.root;
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            if depth > 0 && !config.is_excluded(&path) {
                walk(&path, config, depth - 1, acc);
            }
        } else if is_profile_file(&path) && !(at_root && config.mode == ScanMode::OneLevel) {
            acc.push(path);
        }
    }
}

/// Read a list of profile paths, one per line.
///
/// Blank lines and entries that are not YAML files are skipped. Relative
/// entries are returned as written.
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ValidateError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ValidateError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .filter(|p| is_profile_file(p))
        .collect())
}
