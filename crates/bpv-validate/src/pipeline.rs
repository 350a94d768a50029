//! # Single-Profile Pipeline
//!
//! Runs every stage against one profile file, in order:
//!
//! 1. YAML syntax. A failure here is fatal and skips everything else.
//! 2. JSON schema.
//! 3. Required fields.
//! 4. Codec load and entry points.
//! 5. BACnet object types.
//! 6. Naming and channel-table consistency.
//! 7. Decode tests, when requested and the codec stage passed.
//!
//! Stages 2 to 6 are independent: each runs regardless of earlier
//! failures, so one report lists every problem in the file.

use std::path::{Path, PathBuf};

use bpv_codec::{CodecSandbox, SandboxConfig};
use bpv_core::{Stage, StageReport, ValidationResult, ValidatorConfig};
use bpv_schema::{load_profile, ProfileDocument, SchemaValidationError, SchemaValidator};
use serde::{Deserialize, Serialize};

use crate::codec_check::check_codec;
use crate::fields::check_required_fields;
use crate::naming::{check_naming, derive_model};
use crate::object_types::check_object_types;
use crate::runner::{run_profile_tests, TestRunReport};

/// Per-run switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Run fixture decode tests.
    pub run_tests: bool,
    /// Soft warnings for missing `units` / `updateInterval`.
    pub metadata_warnings: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            run_tests: true,
            metadata_warnings: false,
        }
    }
}

impl From<&ValidatorConfig> for ValidateOptions {
    fn from(config: &ValidatorConfig) -> Self {
        Self {
            metadata_warnings: config.metadata_warnings,
            ..Self::default()
        }
    }
}

/// A stage that did not run, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStage {
    pub stage: Stage,
    pub reason: String,
}

/// Everything found in one profile file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReport {
    pub path: PathBuf,
    /// Model derived from the file name; absent when the YAML did not parse.
    pub derived_model: Option<String>,
    pub valid: bool,
    pub stages: Vec<StageReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestRunReport>,
}

impl ProfileReport {
    /// The report of one stage, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Every error, prefixed with its stage label.
    pub fn errors(&self) -> Vec<String> {
        self.stages
            .iter()
            .flat_map(|s| s.result.errors.iter().map(move |e| format!("{}: {e}", s.stage)))
            .collect()
    }

    pub fn warning_count(&self) -> usize {
        self.stages.iter().map(|s| s.result.warnings.len()).sum()
    }
}

/// Validates profiles with one configuration, schema set and sandbox.
#[derive(Debug)]
pub struct ProfileValidator {
    config: ValidatorConfig,
    schema: SchemaValidator,
    sandbox: CodecSandbox,
}

impl ProfileValidator {
    pub fn new(config: ValidatorConfig, schema: SchemaValidator) -> Self {
        let sandbox = CodecSandbox::new(SandboxConfig::from(&config));
        Self {
            config,
            schema,
            sandbox,
        }
    }

    /// Validator using the schemas embedded in the binary.
    pub fn with_builtin_schemas(config: ValidatorConfig) -> Result<Self, SchemaValidationError> {
        Ok(Self::new(config, SchemaValidator::builtin()?))
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn schema(&self) -> &SchemaValidator {
        &self.schema
    }

    pub fn sandbox(&self) -> &CodecSandbox {
        &self.sandbox
    }

    /// Load and validate one profile file.
    pub fn validate_file(&self, path: &Path, options: &ValidateOptions) -> ProfileReport {
        tracing::info!(path = %path.display(), "validating profile");
        match load_profile(path) {
            Ok(doc) => self.validate_document(&doc, options),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "profile did not load");
                ProfileReport {
                    path: path.to_path_buf(),
                    derived_model: None,
                    valid: false,
                    stages: vec![StageReport::new(
                        Stage::Yaml,
                        ValidationResult::fail(vec![e.to_string()]),
                    )],
                    skipped: Stage::ALL[1..]
                        .iter()
                        .map(|&stage| SkippedStage {
                            stage,
                            reason: "YAML did not parse".to_string(),
                        })
                        .collect(),
                    tests: None,
                }
            }
        }
    }

    /// Validate an already-parsed profile.
    pub fn validate_document(&self, doc: &ProfileDocument, options: &ValidateOptions) -> ProfileReport {
        let path = doc.path.as_path();
        let profile = &doc.value;
        let vendor = profile.get("vendor").and_then(|v| v.as_str());
        let derived_model = derive_model(path, vendor);

        let mut stages = vec![
            StageReport::new(Stage::Yaml, ValidationResult::ok()),
            StageReport::new(Stage::Schema, self.schema.check_profile(profile)),
            StageReport::new(Stage::Fields, check_required_fields(profile)),
            StageReport::new(Stage::Codec, check_codec(profile, &self.sandbox)),
            StageReport::new(
                Stage::ObjectTypes,
                check_object_types(profile, options.metadata_warnings),
            ),
            StageReport::new(Stage::Naming, check_naming(path, profile)),
        ];

        let codec_ok = stages.iter().any(|s| s.stage == Stage::Codec && s.result.valid);
        let mut skipped = Vec::new();
        let mut tests = None;
        if !options.run_tests {
            skipped.push(SkippedStage {
                stage: Stage::Tests,
                reason: "tests not requested".to_string(),
            });
        } else if !codec_ok {
            skipped.push(SkippedStage {
                stage: Stage::Tests,
                reason: "codec stage failed".to_string(),
            });
        } else {
            let fixtures_dir = self.config.fixtures_path(path);
            let (result, report) =
                run_profile_tests(profile, &fixtures_dir, &derived_model, &self.sandbox);
            stages.push(StageReport::new(Stage::Tests, result));
            tests = report;
        }

        let valid = stages.iter().all(|s| s.result.valid);
        tracing::debug!(path = %path.display(), valid, "profile validated");

        ProfileReport {
            path: path.to_path_buf(),
            derived_model: Some(derived_model),
            valid,
            stages,
            skipped,
            tests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"name: Acme LV1 Level Sensor
model: LV1
vendor: Acme
profileVersion: 1.0.0
codec: |
  function decodeUplink(input) {
    return [{ name: "Level", channel: 1, value: input.bytes[0], unit: "cm" }];
  }
datatype:
  1:
    name: Level
    type: AnalogInputObject
    units: cm
lorawan:
  macVersion: 1.0.3
  region: EU868
  supportOTAA: true
  supportClassB: false
  supportClassC: false
"#;

    fn validator() -> ProfileValidator {
        ProfileValidator::with_builtin_schemas(ValidatorConfig::default()).unwrap()
    }

    fn write_profile(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn good_profile_passes_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "Acme-LV1.yaml", PROFILE);
        let report = validator().validate_file(&path, &ValidateOptions::default());
        assert!(report.valid, "{:?}", report.errors());
        assert_eq!(report.derived_model.as_deref(), Some("LV1"));
        assert_eq!(report.stages.len(), 7);
        // No fixtures folder: warning only.
        assert!(report.tests.is_none());
        assert!(!report.stage(Stage::Tests).unwrap().result.warnings.is_empty());
    }

    #[test]
    fn yaml_failure_skips_other_stages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "Acme-LV1.yaml", "model: [oops\n");
        let report = validator().validate_file(&path, &ValidateOptions::default());
        assert!(!report.valid);
        assert_eq!(report.stages.len(), 1);
        assert_eq!(report.stages[0].stage, Stage::Yaml);
        assert_eq!(report.skipped.len(), Stage::ALL.len() - 1);
        assert!(report.derived_model.is_none());
    }

    #[test]
    fn no_tests_option_skips_tests_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "Acme-LV1.yaml", PROFILE);
        let options = ValidateOptions {
            run_tests: false,
            ..ValidateOptions::default()
        };
        let report = validator().validate_file(&path, &options);
        assert!(report.valid);
        assert!(report.stage(Stage::Tests).is_none());
        assert_eq!(report.skipped[0].stage, Stage::Tests);
    }

    #[test]
    fn independent_stages_all_report() {
        let dir = tempfile::tempdir().unwrap();
        let broken = PROFILE
            .replace("type: AnalogInputObject", "type: MultiStateValueObject")
            .replace("  region: EU868\n", "");
        let path = write_profile(dir.path(), "Acme-LV1.yaml", &broken);
        let report = validator().validate_file(&path, &ValidateOptions::default());
        assert!(!report.valid);
        assert!(!report.stage(Stage::Fields).unwrap().result.valid);
        assert!(!report.stage(Stage::ObjectTypes).unwrap().result.valid);
        assert!(report.stage(Stage::Codec).unwrap().result.valid);
    }

    #[test]
    fn report_serializes_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_profile(dir.path(), "Acme-LV1.yaml", PROFILE);
        let report = validator().validate_file(&path, &ValidateOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["derivedModel"], "LV1");
        assert_eq!(json["stages"][0]["stage"], "yaml");
    }

    #[test]
    fn options_follow_config() {
        let cfg = ValidatorConfig {
            metadata_warnings: true,
            ..ValidatorConfig::default()
        };
        let opts = ValidateOptions::from(&cfg);
        assert!(opts.metadata_warnings);
        assert!(opts.run_tests);
    }
}
