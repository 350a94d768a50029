//! # BACnet Object-Type Validator
//!
//! Every channel's `type` must be one of the seven supported object
//! types. Exactly one error is produced per offending channel. Channels
//! with no `type` at all are the field validator's concern and are
//! skipped here.
//!
//! With `metadata_warnings` enabled, analog channels without `units` and
//! channels without `updateInterval` produce warnings.

use bpv_core::{ObjectType, ValidationResult};
use serde_json::Value;

/// Check channel object types against the supported set.
pub fn check_object_types(profile: &Value, metadata_warnings: bool) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let Some(channels) = profile.get("datatype").and_then(Value::as_object) else {
        return result;
    };

    for (key, channel) in channels {
        let Some(declared) = channel.get("type") else {
            continue;
        };
        let Some(name) = declared.as_str() else {
            result.add_error(format!(
                "datatype.{key}: object type must be a string, got {declared}"
            ));
            continue;
        };

        match name.parse::<ObjectType>() {
            Ok(object_type) => {
                if metadata_warnings {
                    metadata_findings(key, channel, object_type, &mut result);
                }
            }
            Err(_) => result.add_error(format!(
                "datatype.{key}: unsupported BACnet object type {name:?}; expected one of: {}",
                ObjectType::supported_list()
            )),
        }
    }

    result
}

fn metadata_findings(key: &str, channel: &Value, object_type: ObjectType, result: &mut ValidationResult) {
    let has_text = |field: &str| {
        channel
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    if object_type.is_analog() && !has_text("units") {
        result.add_warning(format!("datatype.{key}: analog channel has no units"));
    }
    if channel.get("updateInterval").map_or(true, Value::is_null) {
        result.add_warning(format!("datatype.{key}: no updateInterval"));
    }
}
