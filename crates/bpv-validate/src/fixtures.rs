//! Fixture loading and expected-output generation.

use std::path::{Path, PathBuf};

use bpv_codec::UplinkInput;
use bpv_core::{
    parse_hex_payload, ExpectedCase, ExpectedOutputFile, TestDataFile, EXPECTED_OUTPUT_FILE,
    TEST_DATA_FILE,
};
use bpv_schema::load_profile;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, ValidateError};
use crate::naming::derive_model;
use crate::pipeline::ProfileValidator;
use crate::runner::select_cases;

/// The fixture pair of one fixture directory. Either file may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixtures {
    pub dir: PathBuf,
    pub test_data: Option<TestDataFile>,
    pub expected: Option<ExpectedOutputFile>,
}

/// Read `test-data.json` and `expected-output.json` from `dir`.
///
/// Missing files are `None`; unreadable or malformed files are errors.
pub fn load_fixtures(dir: &Path) -> Result<Fixtures> {
    Ok(Fixtures {
        dir: dir.to_path_buf(),
        test_data: read_optional_json(&dir.join(TEST_DATA_FILE))?,
        expected: read_optional_json(&dir.join(EXPECTED_OUTPUT_FILE))?,
    })
}

/// Read a test-data file that must exist.
pub fn load_test_data(path: &Path) -> Result<TestDataFile> {
    read_optional_json(path)?.ok_or_else(|| ValidateError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Read an expected-output file if it exists.
pub fn load_expected_output(path: &Path) -> Result<Option<ExpectedOutputFile>> {
    read_optional_json(path)
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ValidateError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| ValidateError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Decode every test case that applies to a profile and record the result
/// as its expected output.
///
/// Any case that fails to decode aborts generation, so a partial file is
/// never produced.
pub fn generate_expected_output(
    profile_path: &Path,
    validator: &ProfileValidator,
) -> Result<ExpectedOutputFile> {
    let doc = load_profile(profile_path)?;
    let profile = doc.profile();
    let source = profile.codec.as_deref().ok_or(ValidateError::NoCodec)?;
    let model = derive_model(profile_path, profile.vendor.as_deref());

    let test_data_path = validator.config().fixtures_path(profile_path).join(TEST_DATA_FILE);
    let test_data = load_test_data(&test_data_path)?;

    let mut cases = Vec::new();
    for case in select_cases(&test_data.test_cases, &model) {
        let fail = |reason: String| ValidateError::CaseFailed {
            name: case.name.clone(),
            reason,
        };
        let bytes = parse_hex_payload(&case.input).map_err(|e| fail(e.to_string()))?;
        let input = UplinkInput {
            bytes,
            f_port: case.f_port,
            variables: case.variables.clone(),
        };
        let decoded = validator
            .sandbox()
            .decode(source, &input)
            .map_err(|e| fail(e.to_string()))?;
        tracing::debug!(case = %case.name, records = decoded.len(), "generated expected output");
        cases.push(ExpectedCase {
            name: case.name.clone(),
            model: case.model.clone(),
            expected_output: Value::Array(decoded),
        });
    }

    Ok(ExpectedOutputFile {
        description: Some(format!(
            "Expected decode output for {}",
            profile.name.as_deref().unwrap_or(&model)
        )),
        test_cases: cases,
    })
}

/// Fold freshly generated entries into an existing expected-output file.
///
/// An entry recorded for the same `name` and `model` is replaced in place;
/// anything else is appended. Model-less entries are left alone when a
/// model-specific case is generated: other profiles sharing the fixture
/// folder still fall back to them, and [`ExpectedOutputFile::find`] prefers
/// the appended model-specific entry.
pub fn merge_expected_output(
    existing: Option<ExpectedOutputFile>,
    generated: ExpectedOutputFile,
) -> ExpectedOutputFile {
    let Some(mut merged) = existing else {
        return generated;
    };
    for case in generated.test_cases {
        match merged.position_exact(&case.name, case.model.as_deref()) {
            Some(i) => merged.test_cases[i] = case,
            None => merged.test_cases.push(case),
        }
    }
    if merged.description.is_none() {
        merged.description = generated.description;
    }
    merged
}

/// Write an expected-output file as pretty-printed JSON.
pub fn write_expected_output(path: &Path, file: &ExpectedOutputFile) -> Result<()> {
    let mut text = serde_json::to_string_pretty(file).map_err(|e| ValidateError::JsonWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| ValidateError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpv_core::TestCase;

    #[test]
    fn missing_files_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let f = load_fixtures(dir.path()).unwrap();
        assert!(f.test_data.is_none());
        assert!(f.expected.is_none());
    }

    #[test]
    fn malformed_test_data_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TEST_DATA_FILE), "{\"testCases\": [").unwrap();
        let err = load_fixtures(dir.path()).unwrap_err();
        assert!(matches!(err, ValidateError::JsonParse { .. }));
        assert!(err.to_string().contains(TEST_DATA_FILE));
    }

    #[test]
    fn loads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TEST_DATA_FILE),
            r#"{"testCases": [{"name": "A", "fPort": 1, "input": "00"}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(EXPECTED_OUTPUT_FILE),
            r#"{"testCases": [{"name": "A", "expectedOutput": []}]}"#,
        )
        .unwrap();
        let f = load_fixtures(dir.path()).unwrap();
        assert_eq!(f.test_data.unwrap().test_cases.len(), 1);
        assert_eq!(f.expected.unwrap().test_cases[0].name, "A");
    }

    fn entry(name: &str, model: Option<&str>, value: i64) -> ExpectedCase {
        ExpectedCase {
            name: name.into(),
            model: model.map(str::to_string),
            expected_output: serde_json::json!([{ "value": value }]),
        }
    }

    #[test]
    fn merge_replaces_same_case_and_keeps_others() {
        let existing = ExpectedOutputFile {
            description: Some("shared".into()),
            test_cases: vec![entry("A", Some("RS10"), 1), entry("A", Some("LD20"), 2)],
        };
        let generated = ExpectedOutputFile {
            description: Some("new".into()),
            test_cases: vec![entry("A", Some("rs10"), 9), entry("B", Some("RS10"), 3)],
        };
        let merged = merge_expected_output(Some(existing), generated);
        assert_eq!(merged.description.as_deref(), Some("shared"));
        assert_eq!(merged.test_cases.len(), 3);
        assert_eq!(merged.test_cases[0].expected_output[0]["value"], 9);
        assert_eq!(merged.test_cases[1].model.as_deref(), Some("LD20"));
        assert_eq!(merged.test_cases[2].name, "B");
    }

    #[test]
    fn merged_model_entry_is_found_over_shared_entry() {
        let existing = ExpectedOutputFile {
            description: None,
            test_cases: vec![entry("Occupied", None, 1)],
        };
        let generated = ExpectedOutputFile {
            description: None,
            test_cases: vec![entry("Occupied", Some("RS10"), 2)],
        };
        let merged = merge_expected_output(Some(existing), generated);
        assert_eq!(merged.test_cases.len(), 2);

        let case = |model: &str| TestCase {
            name: "Occupied".into(),
            model: Some(model.into()),
            f_port: 1,
            input: "00".into(),
            description: None,
            variables: serde_json::Map::new(),
        };
        let found = merged.find(&case("RS10")).unwrap();
        assert_eq!(found.expected_output[0]["value"], 2);
        let shared = merged.find(&case("LD20")).unwrap();
        assert_eq!(shared.expected_output[0]["value"], 1);

        let again = ExpectedOutputFile {
            description: None,
            test_cases: vec![entry("Occupied", Some("rs10"), 3)],
        };
        let merged = merge_expected_output(Some(merged), again);
        assert_eq!(merged.test_cases.len(), 2);
        assert_eq!(merged.find(&case("RS10")).unwrap().expected_output[0]["value"], 3);
    }

    #[test]
    fn required_test_data_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_test_data(&dir.path().join(TEST_DATA_FILE)).unwrap_err();
        assert!(matches!(err, ValidateError::FileNotFound { .. }));
    }
}
