//! # Profile Loader
//!
//! Reads a profile file and converts its YAML into a `serde_json::Value`
//! tree. Every later check works on that tree, so a structurally broken
//! profile can still be diagnosed field by field.
//!
//! A YAML parse failure is fatal for the file: the pipeline records it and
//! runs no further checks.

use std::path::{Path, PathBuf};

use bpv_core::{json_type_name, Profile};
use serde_json::Value;
use thiserror::Error;

/// Errors from loading a profile file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The path does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid YAML (or uses YAML features JSON cannot hold).
    #[error("YAML syntax error in {}: {message}", path.display())]
    Yaml { path: PathBuf, message: String },

    /// The top level of the document is not a mapping.
    #[error("{}: top level must be a mapping, found {found}", path.display())]
    NotAMapping { path: PathBuf, found: &'static str },
}

/// A parsed profile file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDocument {
    /// Path the document was read from.
    pub path: PathBuf,
    /// The document as a JSON value tree; always an object.
    pub value: Value,
}

impl ProfileDocument {
    /// Lenient typed view of the document.
    pub fn profile(&self) -> Profile {
        Profile::from_value(&self.value)
    }
}

/// Read and parse a profile file.
pub fn load_profile(path: &Path) -> Result<ProfileDocument, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_profile(&content, path)
}

/// Parse profile text. `path` is used for error messages only.
pub fn parse_profile(content: &str, path: &Path) -> Result<ProfileDocument, LoadError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| LoadError::Yaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let value = yaml_to_json_value(&yaml).map_err(|message| LoadError::Yaml {
        path: path.to_path_buf(),
        message,
    })?;

    if !value.is_object() {
        return Err(LoadError::NotAMapping {
            path: path.to_path_buf(),
            found: json_type_name(&value),
        });
    }

    tracing::trace!(path = %path.display(), "profile parsed");
    Ok(ProfileDocument {
        path: path.to_path_buf(),
        value,
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Numeric and boolean map keys become strings (`1:` is the channel key
/// `"1"`); tags are dropped.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
