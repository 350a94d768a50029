//! Fixture files.
//!
//! A profile directory's fixture folder holds two parallel files:
//! `test-data.json` with the uplinks to decode and `expected-output.json`
//! with what each should decode to. Entries pair up by `name`, plus
//! `model` when several models share one fixture folder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of the test-case list.
pub const TEST_DATA_FILE: &str = "test-data.json";

/// File name of the expected decode results.
pub const EXPECTED_OUTPUT_FILE: &str = "expected-output.json";

/// Contents of `test-data.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDataFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Device label written by fixture generators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// One uplink to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    /// Restricts the case to one model of a shared fixture folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "fPort")]
    pub f_port: u8,
    /// Payload as hex text.
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Values passed to the codec as `input.variables`.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl TestCase {
    /// Whether this case runs against a profile with the given derived model.
    ///
    /// Cases without a model run everywhere; otherwise models compare
    /// ASCII case-insensitively.
    pub fn applies_to(&self, model: &str) -> bool {
        match &self.model {
            None => true,
            Some(m) => m.eq_ignore_ascii_case(model),
        }
    }
}

/// Contents of `expected-output.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedOutputFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<ExpectedCase>,
}

/// The decode result one test case should produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub expected_output: Value,
}

impl ExpectedCase {
    /// Whether this entry is recorded for exactly `model` (ASCII
    /// case-insensitive; `None` only matches `None`).
    pub fn is_for_model(&self, model: Option<&str>) -> bool {
        match (self.model.as_deref(), model) {
            (None, None) => true,
            (Some(m), Some(c)) => m.eq_ignore_ascii_case(c),
            _ => false,
        }
    }
}

impl ExpectedOutputFile {
    /// Index of the entry recorded for exactly this `name` and `model`.
    pub fn position_exact(&self, name: &str, model: Option<&str>) -> Option<usize> {
        self.test_cases
            .iter()
            .position(|e| e.name == name && e.is_for_model(model))
    }

    /// Expected entry for a test case.
    ///
    /// An entry with the same `name` and `model` wins; otherwise a model-less
    /// entry with the same `name` applies to every model.
    pub fn find(&self, case: &TestCase) -> Option<&ExpectedCase> {
        self.position_exact(&case.name, case.model.as_deref())
            .or_else(|| {
                self.test_cases
                    .iter()
                    .position(|e| e.name == case.name && e.model.is_none())
            })
            .and_then(|i| self.test_cases.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_reads_camel_case() {
        let file: TestDataFile = serde_json::from_value(json!({
            "description": "RAK7204 uplinks",
            "testCases": [
                {"name": "Environment", "model": "RAK7204", "fPort": 10, "input": "0401"},
                {"name": "Battery", "fPort": 2, "input": "00", "variables": {"offset": 1}}
            ]
        }))
        .unwrap();
        assert_eq!(file.test_cases.len(), 2);
        assert_eq!(file.test_cases[0].f_port, 10);
        assert_eq!(file.test_cases[0].model.as_deref(), Some("RAK7204"));
        assert!(file.test_cases[0].variables.is_empty());
        assert_eq!(file.test_cases[1].variables["offset"], json!(1));
    }

    #[test]
    fn missing_fport_is_rejected() {
        let r: Result<TestDataFile, _> =
            serde_json::from_value(json!({"testCases": [{"name": "x", "input": "00"}]}));
        assert!(r.is_err());
    }

    #[test]
    fn applies_to_ignores_ascii_case() {
        let case = TestCase {
            name: "A".into(),
            model: Some("rak7204".into()),
            f_port: 1,
            input: "00".into(),
            description: None,
            variables: Map::new(),
        };
        assert!(case.applies_to("RAK7204"));
        assert!(!case.applies_to("RAK7200"));
        let any = TestCase { model: None, ..case };
        assert!(any.applies_to("whatever"));
    }

    #[test]
    fn find_matches_name_and_model() {
        let expected = ExpectedOutputFile {
            description: None,
            test_cases: vec![
                ExpectedCase {
                    name: "Uplink".into(),
                    model: Some("X".into()),
                    expected_output: json!([1]),
                },
                ExpectedCase {
                    name: "Uplink".into(),
                    model: Some("Y".into()),
                    expected_output: json!([2]),
                },
                ExpectedCase {
                    name: "Shared".into(),
                    model: None,
                    expected_output: json!([3]),
                },
            ],
        };
        let case = |name: &str, model: Option<&str>| TestCase {
            name: name.into(),
            model: model.map(str::to_string),
            f_port: 1,
            input: "00".into(),
            description: None,
            variables: Map::new(),
        };
        assert_eq!(
            expected.find(&case("Uplink", Some("Y"))).unwrap().expected_output,
            json!([2])
        );
        assert!(expected.find(&case("Uplink", None)).is_none());
        assert!(expected.find(&case("Shared", Some("X"))).is_some());
        assert!(expected.find(&case("Missing", None)).is_none());
    }

    #[test]
    fn find_prefers_model_entry_over_shared_one() {
        let expected = ExpectedOutputFile {
            description: None,
            test_cases: vec![
                ExpectedCase {
                    name: "Occupied".into(),
                    model: None,
                    expected_output: json!(["shared"]),
                },
                ExpectedCase {
                    name: "Occupied".into(),
                    model: Some("RS10".into()),
                    expected_output: json!(["rs10"]),
                },
            ],
        };
        let case = |model: &str| TestCase {
            name: "Occupied".into(),
            model: Some(model.into()),
            f_port: 1,
            input: "00".into(),
            description: None,
            variables: Map::new(),
        };
        assert_eq!(expected.find(&case("rs10")).unwrap().expected_output, json!(["rs10"]));
        assert_eq!(expected.find(&case("LD20")).unwrap().expected_output, json!(["shared"]));
        assert_eq!(expected.position_exact("Occupied", None), Some(0));
        assert_eq!(expected.position_exact("Occupied", Some("LD20")), None);
    }

    #[test]
    fn expected_output_serializes_camel_case() {
        let file = ExpectedOutputFile {
            description: None,
            test_cases: vec![ExpectedCase {
                name: "A".into(),
                model: None,
                expected_output: json!([]),
            }],
        };
        let v = serde_json::to_value(&file).unwrap();
        assert!(v["testCases"][0].get("expectedOutput").is_some());
        assert!(v["testCases"][0].get("model").is_none());
    }
}
