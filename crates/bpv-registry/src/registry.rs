//! # Registry Index
//!
//! `registry.json` lists every profile in the tree with enough metadata for
//! a catalogue page: identity, version, whether it validates, whether it
//! has fixtures, a device category and its LoRaWAN class.
//!
//! Building the index validates each profile structurally (tests are not
//! run). Checking an existing index validates it against
//! `registry.schema.json` and then compares it with the tree it describes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use bpv_core::{Profile, ValidationResult, TEST_DATA_FILE};
use bpv_schema::{load_profile, SchemaValidator};
use bpv_validate::{
    derive_model, load_test_data, scan_profiles, select_cases, ProfileValidator, ScanConfig,
    ValidateError, ValidateOptions,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device_type::{classify_device_type, DeviceType};
use crate::error::RegistryError;

/// Format version of the registry document.
pub const REGISTRY_VERSION: &str = "1.0.0";

/// One profile in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub id: String,
    pub vendor: String,
    pub model: String,
    pub version: Option<String>,
    /// Relative to the profiles root, `/`-separated.
    pub path: String,
    /// Structural validation passed.
    pub verified: bool,
    /// At least one fixture case applies to this model.
    pub has_tests: bool,
    pub description: Option<String>,
    pub device_type: DeviceType,
    pub lorawan_class: String,
    /// File modification time, RFC 3339.
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub by_vendor: BTreeMap<String, usize>,
    pub with_tests: usize,
    pub without_tests: usize,
}

/// The whole `registry.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub version: String,
    pub last_update: String,
    pub total_profiles: usize,
    pub profiles: Vec<RegistryEntry>,
    pub statistics: Statistics,
}

impl Registry {
    /// Assemble a registry from entries, computing totals and statistics.
    pub fn from_entries(entries: Vec<RegistryEntry>, now: DateTime<Utc>) -> Self {
        let mut statistics = Statistics::default();
        for entry in &entries {
            *statistics.by_vendor.entry(entry.vendor.clone()).or_default() += 1;
            if entry.has_tests {
                statistics.with_tests += 1;
            } else {
                statistics.without_tests += 1;
            }
        }
        Self {
            version: REGISTRY_VERSION.to_string(),
            last_update: rfc3339(now),
            total_profiles: entries.len(),
            profiles: entries,
            statistics,
        }
    }
}

fn rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn slug(vendor: &str, model: &str) -> String {
    format!("{vendor}-{model}")
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Scan `profiles_root` and build an index entry for each profile that loads.
///
/// Profiles that do not parse are left out with a warning.
pub fn build_registry(
    profiles_root: &Path,
    validator: &ProfileValidator,
    now: DateTime<Utc>,
) -> Registry {
    let files = scan_profiles(&ScanConfig::new(profiles_root, validator.config()));
    let options = ValidateOptions {
        run_tests: false,
        ..ValidateOptions::from(validator.config())
    };

    let mut entries = Vec::with_capacity(files.len());
    for path in &files {
        if let Some(entry) = build_entry(path, profiles_root, validator, &options) {
            entries.push(entry);
        }
    }
    tracing::info!(
        root = %profiles_root.display(),
        scanned = files.len(),
        indexed = entries.len(),
        "built profile registry"
    );
    Registry::from_entries(entries, now)
}

fn build_entry(
    path: &Path,
    root: &Path,
    validator: &ProfileValidator,
    options: &ValidateOptions,
) -> Option<RegistryEntry> {
    let doc = match load_profile(path) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping profile that does not load");
            return None;
        }
    };
    let profile: Profile = doc.profile();
    let derived = derive_model(path, profile.vendor.as_deref());
    let vendor = profile
        .vendor
        .clone()
        .or_else(|| {
            path.parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    let model = profile.model.clone().unwrap_or_else(|| derived.clone());

    let verified = validator.validate_document(&doc, options).valid;
    let has_tests = has_test_cases(path, validator, &derived);
    let last_update = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(|t| rfc3339(DateTime::<Utc>::from(t)));

    Some(RegistryEntry {
        id: profile.id.clone().unwrap_or_else(|| slug(&vendor, &model)),
        device_type: classify_device_type(profile.name.as_deref().unwrap_or(""), &model),
        lorawan_class: profile.lorawan.device_class().to_string(),
        version: profile.profile_version.clone(),
        path: relative_path(path, root),
        description: profile.name.clone(),
        vendor,
        model,
        verified,
        has_tests,
        last_update,
    })
}

/// Whether the profile's fixture folder has cases for `model`.
fn has_test_cases(path: &Path, validator: &ProfileValidator, model: &str) -> bool {
    let test_data = validator.config().fixtures_path(path).join(TEST_DATA_FILE);
    match load_test_data(&test_data) {
        Ok(data) => !select_cases(&data.test_cases, model).is_empty(),
        Err(ValidateError::FileNotFound { .. }) => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "treating profile as untested");
            false
        }
    }
}

/// Write the registry as pretty-printed JSON.
pub fn write_registry(path: &Path, registry: &Registry) -> Result<(), RegistryError> {
    let mut text = serde_json::to_string_pretty(registry).map_err(|e| RegistryError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| RegistryError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a registry file as a raw JSON value.
pub fn read_registry(path: &Path) -> Result<Value, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RegistryError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RegistryError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|e| RegistryError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Check an existing registry file against its schema and the profiles tree.
///
/// Schema violations are reported first; the consistency checks only run
/// on a document that conforms. A registry that lists a missing file, or
/// misses a profile that exists, is stale.
pub fn check_registry(
    path: &Path,
    profiles_root: &Path,
    schema: &SchemaValidator,
    excluded_dirs: &[String],
) -> Result<ValidationResult, RegistryError> {
    let document = read_registry(path)?;
    let mut result = schema.check_registry_document(&document);
    if !result.valid {
        return Ok(result);
    }

    let registry: Registry = match serde_json::from_value(document) {
        Ok(r) => r,
        Err(e) => {
            result.add_error(format!("registry does not match the expected shape: {e}"));
            return Ok(result);
        }
    };

    if registry.total_profiles != registry.profiles.len() {
        result.add_error(format!(
            "totalProfiles is {} but {} profiles are listed",
            registry.total_profiles,
            registry.profiles.len()
        ));
    }

    let mut listed = BTreeSet::new();
    for entry in &registry.profiles {
        if !listed.insert(entry.path.as_str()) {
            result.add_error(format!("{}: listed more than once", entry.path));
        }
        if !profiles_root.join(&entry.path).is_file() {
            result.add_error(format!("{}: listed profile does not exist", entry.path));
        }
    }

    let scan = ScanConfig {
        root: profiles_root.to_path_buf(),
        excluded_dirs: excluded_dirs.to_vec(),
        mode: Default::default(),
    };
    for file in scan_profiles(&scan) {
        let rel = relative_path(&file, profiles_root);
        if !listed.contains(rel.as_str()) {
            result.add_error(format!("{rel}: profile is missing from the registry"));
        }
    }

    let with_tests = registry.profiles.iter().filter(|e| e.has_tests).count();
    if registry.statistics.with_tests != with_tests
        || registry.statistics.without_tests != registry.profiles.len() - with_tests
    {
        result.add_warning("statistics do not match the listed profiles");
    }

    tracing::debug!(path = %path.display(), valid = result.valid, "checked registry");
    Ok(result)
}
