//! # Validation Results
//!
//! Every check in the pipeline reports through [`ValidationResult`]. A
//! result is invalid as soon as one error is recorded; warnings never
//! affect validity. Results from several checks merge into one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the check passed.
    pub valid: bool,
    /// Hard failures, in the order they were found.
    pub errors: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a failed validation result with the given errors.
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }

    /// Add an error. Marks result as invalid.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    /// Add a warning (does not affect validity).
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// A stage of the single-profile pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// YAML parse. Failure here skips every later stage.
    Yaml,
    /// JSON Schema conformance.
    Schema,
    /// Required top-level, channel and LoRaWAN fields.
    Fields,
    /// Codec loads and defines its entry points.
    Codec,
    /// Channel types belong to the supported set.
    ObjectTypes,
    /// File naming and channel-table consistency.
    Naming,
    /// Fixture-driven decode tests.
    Tests,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 7] = [
        Self::Yaml,
        Self::Schema,
        Self::Fields,
        Self::Codec,
        Self::ObjectTypes,
        Self::Naming,
        Self::Tests,
    ];

    /// Short label used in text output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML syntax",
            Self::Schema => "JSON schema",
            Self::Fields => "Required fields",
            Self::Codec => "Codec",
            Self::ObjectTypes => "BACnet object types",
            Self::Naming => "Naming",
            Self::Tests => "Decode tests",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A check result tagged with the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl StageReport {
    pub fn new(stage: Stage, result: ValidationResult) -> Self {
        Self { stage, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_valid_and_empty() {
        let r = ValidationResult::ok();
        assert!(r.valid);
        assert!(r.errors.is_empty());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn fail_with_errors_is_invalid() {
        let r = ValidationResult::fail(vec!["missing required field: model".into()]);
        assert!(!r.valid);
        assert_eq!(r.errors.len(), 1);
    }

    #[test]
    fn fail_with_no_errors_stays_valid() {
        assert!(ValidationResult::fail(Vec::new()).valid);
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let mut r = ValidationResult::ok();
        r.add_warning("no encodeDownlink");
        assert!(r.valid);
        assert_eq!(r.warnings, vec!["no encodeDownlink".to_string()]);
    }

    #[test]
    fn merge_propagates_invalidity() {
        let mut a = ValidationResult::ok();
        let mut b = ValidationResult::ok();
        b.add_error("bad");
        b.add_warning("meh");
        a.merge(b);
        assert!(!a.valid);
        assert_eq!(a.errors, vec!["bad".to_string()]);
        assert_eq!(a.warnings, vec!["meh".to_string()]);
    }

    #[test]
    fn stage_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::ObjectTypes).unwrap(), "\"object_types\"");
    }

    #[test]
    fn stage_report_flattens_result() {
        let report = StageReport::new(Stage::Fields, ValidationResult::fail(vec!["x".into()]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "fields");
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0], "x");
    }

    #[test]
    fn stages_are_ordered() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }
}
