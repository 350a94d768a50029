//! # Required-Field Validator
//!
//! Checks that a parsed profile carries everything the gateway needs,
//! independently of the schema stage. Errors are reported in a fixed
//! order: top-level keys, codec content, channel definitions, LoRaWAN
//! parameters.

use bpv_core::{ValidationResult, DECODE_ENTRY_POINT, REQUIRED_LORAWAN_KEYS, REQUIRED_PROFILE_KEYS};
use serde_json::Value;

/// Check required top-level, channel and LoRaWAN fields.
///
/// Stateless: the same input always yields the same result.
pub fn check_required_fields(profile: &Value) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for key in REQUIRED_PROFILE_KEYS {
        if is_blank(profile.get(key)) {
            result.add_error(format!("missing required field: {key}"));
        }
    }

    match profile.get("codec") {
        Some(Value::String(code)) if !code.trim().is_empty() => {
            if !code.contains(DECODE_ENTRY_POINT) {
                result.add_error(format!("codec does not contain a {DECODE_ENTRY_POINT} function"));
            }
        }
        Some(v) if !is_blank(Some(v)) => result.add_error("codec must be a string"),
        _ => {}
    }

    match profile.get("datatype") {
        Some(Value::Object(channels)) => {
            for (key, channel) in channels {
                let Some(def) = channel.as_object() else {
                    result.add_error(format!("datatype.{key}: channel definition must be a mapping"));
                    continue;
                };
                for field in ["name", "type"] {
                    if is_blank(def.get(field)) {
                        result.add_error(format!("datatype.{key}: missing required field: {field}"));
                    }
                }
            }
        }
        Some(v) if !is_blank(Some(v)) => {
            result.add_error("datatype must be a mapping of channel id to channel definition")
        }
        _ => {}
    }

    match profile.get("lorawan") {
        Some(Value::Object(params)) => {
            for key in REQUIRED_LORAWAN_KEYS {
                if params.get(key).map_or(true, Value::is_null) {
                    result.add_error(format!("missing required field: lorawan.{key}"));
                }
            }
        }
        Some(v) if !is_blank(Some(v)) => result.add_error("lorawan must be a mapping"),
        _ => {}
    }

    result
}

/// Absent, null, whitespace-only string, or empty collection.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> Value {
        json!({
            "model": "RS10",
            "vendor": "Acme",
            "codec": "function decodeUplink(input) { return []; }",
            "datatype": {"1": {"name": "Temperature", "type": "AnalogInputObject"}},
            "lorawan": {
                "macVersion": "1.0.3",
                "region": "EU868",
                "supportOTAA": true,
                "supportClassB": false,
                "supportClassC": false
            }
        })
    }

    #[test]
    fn complete_profile_passes() {
        let r = check_required_fields(&complete());
        assert!(r.valid, "{:?}", r.errors);
    }

    #[test]
    fn one_error_per_missing_key() {
        let mut doc = complete();
        let map = doc.as_object_mut().unwrap();
        map.remove("model");
        map.remove("lorawan");
        let r = check_required_fields(&doc);
        assert_eq!(
            r.errors,
            vec![
                "missing required field: model".to_string(),
                "missing required field: lorawan".to_string(),
            ]
        );
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut doc = complete();
        doc["model"] = json!("  ");
        doc["datatype"] = json!({});
        let r = check_required_fields(&doc);
        assert!(r.errors.contains(&"missing required field: model".to_string()));
        assert!(r.errors.contains(&"missing required field: datatype".to_string()));
    }

    #[test]
    fn codec_without_decode_entry_point() {
        let mut doc = complete();
        doc["codec"] = json!("function decode(bytes) { return {}; }");
        let r = check_required_fields(&doc);
        assert_eq!(r.errors, vec!["codec does not contain a decodeUplink function".to_string()]);
    }

    #[test]
    fn channel_needs_name_and_type() {
        let mut doc = complete();
        doc["datatype"]["2"] = json!({"units": "%"});
        let r = check_required_fields(&doc);
        assert_eq!(
            r.errors,
            vec![
                "datatype.2: missing required field: name".to_string(),
                "datatype.2: missing required field: type".to_string(),
            ]
        );
    }

    #[test]
    fn lorawan_keys_checked_individually() {
        let mut doc = complete();
        doc["lorawan"].as_object_mut().unwrap().remove("supportClassB");
        doc["lorawan"].as_object_mut().unwrap().remove("region");
        let r = check_required_fields(&doc);
        assert_eq!(
            r.errors,
            vec![
                "missing required field: lorawan.region".to_string(),
                "missing required field: lorawan.supportClassB".to_string(),
            ]
        );
    }

    #[test]
    fn false_flags_are_present() {
        let mut doc = complete();
        doc["lorawan"]["supportOTAA"] = json!(false);
        assert!(check_required_fields(&doc).valid);
    }

    #[test]
    fn wrong_container_types_reported() {
        let mut doc = complete();
        doc["datatype"] = json!(["Temperature"]);
        doc["lorawan"] = json!("EU868");
        let r = check_required_fields(&doc);
        assert_eq!(r.errors.len(), 2, "{:?}", r.errors);
    }
}
