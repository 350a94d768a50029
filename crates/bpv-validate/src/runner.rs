//! # Test-Case Filter & Runner
//!
//! Decodes each fixture uplink with the profile's codec and compares the
//! result with the matching expected-output entry.
//!
//! Several models of one vendor usually share a fixture folder, so cases
//! carry an optional `model`. Only cases without a model, or whose model
//! equals the profile's file-derived model, run against a profile.
//!
//! Each case reports one [`CaseOutcome`]; a failing case never prevents
//! the remaining cases from running.

use std::path::Path;

use bpv_codec::{CodecSandbox, UplinkInput};
use bpv_core::{
    first_difference, parse_hex_payload, Difference, ExpectedOutputFile, TestCase,
    ValidationResult, TEST_DATA_FILE,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fixtures::load_fixtures;

/// Result of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Output equals the expected entry.
    Matched,
    /// Decoded without error but no expected entry exists. Counts as a pass.
    Unverified { actual: Value },
    /// Output differs from the expected entry.
    Mismatch {
        actual: Value,
        expected: Value,
        difference: Option<Difference>,
    },
    /// The case could not be decoded (bad hex, codec error, timeout).
    Error { message: String },
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Matched | Self::Unverified { .. })
    }
}

/// One case and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "fPort")]
    pub f_port: u8,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

/// All cases run against one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunReport {
    /// Cases in the fixture file before model filtering.
    pub available: usize,
    pub passed: usize,
    pub failed: usize,
    pub cases: Vec<CaseReport>,
}

/// Cases whose `model` is absent or equals `model`.
///
/// The comparison ignores ASCII case, so a fixture written for `rs10` also
/// runs against `Acme-RS10.yaml`. Fixture folders are hand-edited and the
/// model usually comes from a file name, whose case is not significant.
pub fn select_cases<'a>(cases: &'a [TestCase], model: &str) -> Vec<&'a TestCase> {
    cases.iter().filter(|c| c.applies_to(model)).collect()
}

/// Decode one case and compare it with its expected entry.
pub fn run_case(
    source: &str,
    case: &TestCase,
    expected: Option<&ExpectedOutputFile>,
    sandbox: &CodecSandbox,
) -> CaseReport {
    evaluate(source, case, expected, sandbox).0
}

/// Like [`run_case`], also handing back the decoded output when there is one.
fn evaluate(
    source: &str,
    case: &TestCase,
    expected: Option<&ExpectedOutputFile>,
    sandbox: &CodecSandbox,
) -> (CaseReport, Option<Value>) {
    let decoded = decode_case(source, case, sandbox);
    let outcome = match &decoded {
        Err(message) => CaseOutcome::Error {
            message: message.clone(),
        },
        Ok(actual) => match expected.and_then(|e| e.find(case)) {
            None => CaseOutcome::Unverified {
                actual: actual.clone(),
            },
            Some(entry) => match first_difference(actual, &entry.expected_output) {
                None => CaseOutcome::Matched,
                Some(difference) => CaseOutcome::Mismatch {
                    actual: actual.clone(),
                    expected: entry.expected_output.clone(),
                    difference: Some(difference),
                },
            },
        },
    };
    let report = CaseReport {
        name: case.name.clone(),
        model: case.model.clone(),
        f_port: case.f_port,
        outcome,
    };
    (report, decoded.ok())
}

fn decode_case(source: &str, case: &TestCase, sandbox: &CodecSandbox) -> Result<Value, String> {
    let bytes = parse_hex_payload(&case.input).map_err(|e| format!("invalid input: {e}"))?;
    let input = UplinkInput {
        bytes,
        f_port: case.f_port,
        variables: case.variables.clone(),
    };
    sandbox
        .decode(source, &input)
        .map(Value::Array)
        .map_err(|e| e.to_string())
}

/// Run the fixture tests of one profile.
///
/// A missing `test-data.json` is a warning and yields no report. Fixture
/// files that exist but cannot be parsed are errors. Decoded records for
/// channels absent from `datatype` are warnings.
pub fn run_profile_tests(
    profile: &Value,
    fixtures_dir: &Path,
    model: &str,
    sandbox: &CodecSandbox,
) -> (ValidationResult, Option<TestRunReport>) {
    let mut result = ValidationResult::ok();

    let Some(source) = profile.get("codec").and_then(Value::as_str) else {
        result.add_error("profile has no codec");
        return (result, None);
    };

    let fixtures = match load_fixtures(fixtures_dir) {
        Ok(f) => f,
        Err(e) => {
            result.add_error(e.to_string());
            return (result, None);
        }
    };
    let Some(test_data) = fixtures.test_data else {
        result.add_warning(format!(
            "no {TEST_DATA_FILE} in {}; decode tests skipped",
            fixtures_dir.display()
        ));
        return (result, None);
    };

    let selected = select_cases(&test_data.test_cases, model);
    if selected.is_empty() {
        result.add_warning(format!("no test cases apply to model {model}"));
    }

    let channels = profile.get("datatype").and_then(Value::as_object);
    let mut report = TestRunReport {
        available: test_data.test_cases.len(),
        ..TestRunReport::default()
    };

    for case in selected {
        let (case_report, decoded) = evaluate(source, case, fixtures.expected.as_ref(), sandbox);
        match &case_report.outcome {
            CaseOutcome::Matched => {}
            CaseOutcome::Unverified { .. } => result.add_warning(format!(
                "test case {:?}: no expected output; result not verified",
                case.name
            )),
            CaseOutcome::Mismatch { difference, .. } => {
                let detail = difference
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                result.add_error(format!("test case {:?}: output mismatch {detail}", case.name));
            }
            CaseOutcome::Error { message } => {
                result.add_error(format!("test case {:?}: {message}", case.name))
            }
        }

        if let (Some(channels), Some(decoded)) = (channels, &decoded) {
            for channel in undeclared_channels(decoded, channels) {
                result.add_warning(format!(
                    "test case {:?}: decoded channel {channel} is not defined in datatype",
                    case.name
                ));
            }
        }

        if case_report.outcome.passed() {
            report.passed += 1;
        } else {
            report.failed += 1;
        }
        tracing::debug!(case = %case.name, passed = case_report.outcome.passed(), "test case finished");
        report.cases.push(case_report);
    }

    (result, Some(report))
}

/// Channel ids in decoded output that `datatype` does not declare.
fn undeclared_channels(decoded: &Value, channels: &serde_json::Map<String, Value>) -> Vec<String> {
    decoded
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|record| record.get("channel"))
        .map(|c| match c {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .filter(|id| !channels.contains_key(id))
        .collect()
}
