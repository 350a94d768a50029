//! Codec stage: the embedded script loads and defines its entry points.

use bpv_codec::{CodecSandbox, SandboxError};
use bpv_core::{ValidationResult, DECODE_ENTRY_POINT, ENCODE_ENTRY_POINT};
use serde_json::Value;

/// Load the profile's codec in the sandbox and check its entry points.
///
/// A missing `decodeUplink` is an error; a missing `encodeDownlink` only
/// a warning, since downlink control is optional.
pub fn check_codec(profile: &Value, sandbox: &CodecSandbox) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let source = match profile.get("codec") {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => {
            result.add_error("profile has no codec");
            return result;
        }
    };

    match sandbox.inspect(source) {
        Ok(found) => {
            if !found.has_decode {
                result.add_error(format!(
                    "codec does not define required entry point {DECODE_ENTRY_POINT}"
                ));
            }
            if !found.has_encode {
                result.add_warning(format!(
                    "codec does not define {ENCODE_ENTRY_POINT}; downlinks are not supported"
                ));
            }
        }
        Err(SandboxError::Load(msg)) => result.add_error(format!("codec syntax error: {msg}")),
        Err(e) => result.add_error(e.to_string()),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(codec: Value) -> ValidationResult {
        check_codec(&json!({ "codec": codec }), &CodecSandbox::default())
    }

    #[test]
    fn complete_codec_passes_cleanly() {
        let r = check(json!(
            "function decodeUplink(i) { return []; }\nfunction encodeDownlink(i) { return []; }"
        ));
        assert!(r.valid, "{:?}", r.errors);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn missing_encode_is_warning() {
        let r = check(json!("function decodeUplink(i) { return []; }"));
        assert!(r.valid);
        assert_eq!(r.warnings.len(), 1);
        assert!(r.warnings[0].contains("encodeDownlink"));
    }

    #[test]
    fn missing_decode_names_entry_point() {
        let r = check(json!("function decode(bytes) { return {}; }"));
        assert!(!r.valid);
        assert_eq!(
            r.errors,
            vec!["codec does not define required entry point decodeUplink".to_string()]
        );
    }

    #[test]
    fn syntax_error_is_reported() {
        let r = check(json!("function decodeUplink(i) { return [; }"));
        assert!(!r.valid);
        assert!(r.errors[0].starts_with("codec syntax error"), "{:?}", r.errors);
    }

    #[test]
    fn absent_codec_is_an_error() {
        let r = check_codec(&json!({"model": "X"}), &CodecSandbox::default());
        assert_eq!(r.errors, vec!["profile has no codec".to_string()]);
    }
}
