//! Loading real profile files from disk and checking them against the
//! embedded schema.

use bpv_schema::{load_profile, LoadError, SchemaValidator};

const PROFILE: &str = r#"name: Acme TH10 Temperature & Humidity Sensor
model: TH10
vendor: Acme
profileVersion: 1.2.0
codec: |
  function decodeUplink(input) {
    var b = input.bytes;
    return [
      { name: "Temperature", channel: 1, value: b[0] / 2, unit: "°C" },
      { name: "Humidity", channel: 2, value: b[1], unit: "%" }
    ];
  }
datatype:
  1:
    name: Temperature
    type: AnalogInputObject
    units: "°C"
    covIncrement: 0.5
  2:
    name: Humidity
    type: AnalogInputObject
    units: "%"
lorawan:
  macVersion: 1.0.3
  region: EU868
  supportOTAA: true
  supportClassB: false
  supportClassC: false
"#;

#[test]
fn well_formed_profile_loads_and_passes_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Acme-TH10.yaml");
    std::fs::write(&path, PROFILE).unwrap();

    let doc = load_profile(&path).unwrap();
    let profile = doc.profile();
    assert_eq!(profile.model.as_deref(), Some("TH10"));
    assert_eq!(profile.datatype.len(), 2);
    assert_eq!(profile.lorawan.mac_version.as_deref(), Some("1.0.3"));

    let schema = SchemaValidator::builtin().unwrap();
    let result = schema.check_profile(&doc.value);
    assert!(result.valid, "{:?}", result.errors);
}

#[test]
fn every_violation_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Acme-Broken.yaml");
    std::fs::write(
        &path,
        "model: Broken\nprofileVersion: latest\ndatatype:\n  abc: {}\nlorawan:\n  supportOTAA: 1\n",
    )
    .unwrap();

    let doc = load_profile(&path).unwrap();
    let result = SchemaValidator::builtin().unwrap().check_profile(&doc.value);
    assert!(!result.valid);
    // missing codec + missing vendor, bad version, bad channel key, bad boolean
    assert!(result.errors.len() >= 4, "{:?}", result.errors);
}

#[test]
fn broken_yaml_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Acme-Bad.yaml");
    std::fs::write(&path, "model: TH10\ndatatype:\n  1: [unterminated\n").unwrap();
    assert!(matches!(load_profile(&path), Err(LoadError::Yaml { .. })));
}
