//! # Schema Validation
//!
//! Runtime validation of profile and registry documents against JSON
//! Schema definitions (Draft 7).
//!
//! The two schemas ship inside the binary. A directory of
//! `*.schema.json` files can replace them, which lets a profile
//! repository pin its own schema revision.
//!
//! Internal `$ref`s of the form `#/definitions/<name>` are resolved by the
//! jsonschema crate natively; the schemas have no cross-file references.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use bpv_core::ValidationResult;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// File name of the profile schema.
pub const PROFILE_SCHEMA: &str = "profile.schema.json";

/// File name of the registry schema.
pub const REGISTRY_SCHEMA: &str = "registry.schema.json";

const BUILTIN_SCHEMAS: [(&str, &str); 2] = [
    (
        PROFILE_SCHEMA,
        include_str!("../../../schemas/profile.schema.json"),
    ),
    (
        REGISTRY_SCHEMA,
        include_str!("../../../schemas/registry.schema.json"),
    ),
];

/// Error while loading or compiling schemas.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or directory.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        schema_name: String,
        reason: String,
    },

    /// A required schema is absent from the loaded set.
    #[error("schema '{0}' is not loaded")]
    MissingSchema(String),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Compiled profile and registry schemas.
///
/// Schemas compile once at construction; every check afterwards reuses the
/// compiled validator, so one `SchemaValidator` serves a whole batch.
pub struct SchemaValidator {
    /// Where the schemas came from (`None` for the embedded set).
    source: Option<PathBuf>,
    validators: BTreeMap<String, Validator>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("source", &self.source)
            .field("schemas", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaValidator {
    /// Compile the schemas embedded in the binary.
    ///
    /// # Errors
    ///
    /// Only fails if an embedded schema is itself malformed.
    pub fn builtin() -> Result<Self, SchemaValidationError> {
        let mut validators = BTreeMap::new();
        for (name, text) in BUILTIN_SCHEMAS {
            let value: Value =
                serde_json::from_str(text).map_err(|e| SchemaValidationError::SchemaLoadError {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            validators.insert(name.to_string(), compile(name, &value)?);
        }
        Ok(Self {
            source: None,
            validators,
        })
    }

    /// Load every `*.schema.json` file in `schema_dir`.
    ///
    /// The directory must provide at least `profile.schema.json`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the directory or a
    /// schema file cannot be read or parsed as JSON.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let load_err = |name: &str, reason: String| SchemaValidationError::SchemaLoadError {
            schema_name: name.to_string(),
            reason,
        };

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| {
            load_err(
                &schema_dir.display().to_string(),
                format!("cannot read schema directory: {e}"),
            )
        })?;

        let mut validators = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                load_err(&schema_dir.display().to_string(), e.to_string())
            })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".schema.json") {
                continue;
            }
            let content =
                std::fs::read_to_string(&path).map_err(|e| load_err(name, e.to_string()))?;
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| load_err(name, format!("invalid JSON: {e}")))?;
            validators.insert(name.to_string(), compile(name, &value)?);
        }

        if !validators.contains_key(PROFILE_SCHEMA) {
            return Err(SchemaValidationError::MissingSchema(PROFILE_SCHEMA.to_string()));
        }
        tracing::debug!(
            dir = %schema_dir.display(),
            count = validators.len(),
            "loaded schemas"
        );

        Ok(Self {
            source: Some(schema_dir),
            validators,
        })
    }

    /// The schema directory, or `None` for the embedded schemas.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Names of all loaded schemas, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        self.validators.keys().map(String::as_str).collect()
    }

    /// Validate a value against a named schema, returning every violation.
    pub fn violations(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<Vec<Violation>, SchemaValidationError> {
        let validator = self
            .validators
            .get(schema_name)
            .ok_or_else(|| SchemaValidationError::MissingSchema(schema_name.to_string()))?;

        Ok(validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect())
    }

    /// Check a parsed profile against `profile.schema.json`.
    pub fn check_profile(&self, profile: &Value) -> ValidationResult {
        self.check(profile, PROFILE_SCHEMA)
    }

    /// Check a parsed registry index against `registry.schema.json`.
    pub fn check_registry_document(&self, registry: &Value) -> ValidationResult {
        self.check(registry, REGISTRY_SCHEMA)
    }

    fn check(&self, instance: &Value, schema_name: &str) -> ValidationResult {
        match self.violations(instance, schema_name) {
            Ok(violations) => {
                ValidationResult::fail(violations.iter().map(ToString::to_string).collect())
            }
            Err(e) => ValidationResult::fail(vec![e.to_string()]),
        }
    }
}

fn compile(name: &str, schema: &Value) -> Result<Validator, SchemaValidationError> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.build(schema)
        .map_err(|e| SchemaValidationError::ValidatorBuildError {
            schema_name: name.to_string(),
            reason: e.to_string(),
        })
}
