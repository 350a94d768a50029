//! # Naming & Channel-Table Consistency
//!
//! Profiles are named `<Vendor>-<Model>.yaml` (or with `_`), and the model
//! derived from that name selects which fixture cases apply. This stage
//! also checks the channel table for problems the schema cannot express:
//! duplicate names and `channel` echoes that disagree with their key.

use std::collections::BTreeMap;
use std::path::Path;

use bpv_core::ValidationResult;
use serde_json::Value;

/// Derive the model name from a profile's file name.
///
/// Strips a `<vendor>-` or `<vendor>_` prefix (case-insensitive, spaces in
/// the vendor match `-`), trying the `vendor` field first and then the
/// parent directory name. Without a matching prefix the whole stem is the
/// model.
pub fn derive_model(path: &Path, vendor: Option<&str>) -> String {
    let stem = file_stem(path);
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());

    for candidate in [vendor, parent].into_iter().flatten() {
        if let Some(rest) = strip_vendor_prefix(&stem, candidate) {
            return rest.to_string();
        }
    }
    stem
}

/// Check file naming and channel-table consistency.
pub fn check_naming(path: &Path, profile: &Value) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let stem = file_stem(path);

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !matches!(extension, "yaml" | "yml") {
        result.add_error(format!(
            "file extension must be .yaml or .yml, found {:?}",
            extension
        ));
    }

    let vendor = profile.get("vendor").and_then(Value::as_str);
    if let Some(vendor) = vendor.filter(|v| !v.trim().is_empty()) {
        if strip_vendor_prefix(&stem, vendor).is_none() {
            result.add_error(format!(
                "file name {stem:?} must start with the vendor prefix \"{}-\"",
                vendor.trim().replace(' ', "-")
            ));
        }
    }

    let derived = derive_model(path, vendor);
    if derived.trim().is_empty() {
        result.add_error(format!("cannot derive a model name from file name {stem:?}"));
    } else if let Some(model) = profile.get("model").and_then(Value::as_str) {
        if !model.eq_ignore_ascii_case(&derived) {
            result.add_warning(format!(
                "model derived from file name ({derived}) differs from model field ({model})"
            ));
        }
    }

    if let Some(channels) = profile.get("datatype").and_then(Value::as_object) {
        let mut names: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, channel) in channels {
            match key.parse::<u64>() {
                Ok(n) if n > 0 => {
                    if let Some(echo) = channel.get("channel") {
                        if echo.as_u64() != Some(n) {
                            result.add_error(format!(
                                "datatype.{key}: channel field {echo} does not match its key"
                            ));
                        }
                    }
                }
                _ => result.add_error(format!(
                    "datatype.{key}: channel id must be a positive integer"
                )),
            }

            if let Some(name) = channel.get("name").and_then(Value::as_str) {
                if let Some(first) = names.get(name) {
                    result.add_error(format!(
                        "datatype.{key}: duplicate channel name {name:?} (also datatype.{first})"
                    ));
                } else {
                    names.insert(name, key);
                }
            }
        }
    }

    result
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

fn strip_vendor_prefix<'a>(stem: &'a str, vendor: &str) -> Option<&'a str> {
    let prefix = vendor.trim().replace(' ', "-");
    if prefix.is_empty() || stem.len() <= prefix.len() {
        return None;
    }
    let head = stem.get(..prefix.len())?;
    let tail = stem.get(prefix.len()..)?;
    if !head.eq_ignore_ascii_case(&prefix) {
        return None;
    }
    tail.strip_prefix('-')
        .or_else(|| tail.strip_prefix('_'))
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derive_strips_vendor_field_prefix() {
        let p = Path::new("profiles/Acme/Acme-RS10.yaml");
        assert_eq!(derive_model(p, Some("Acme")), "RS10");
    }

    #[test]
    fn derive_is_case_insensitive_and_accepts_underscore() {
        let p = Path::new("profiles/acme/ACME_RS10.yaml");
        assert_eq!(derive_model(p, Some("Acme")), "RS10");
    }

    #[test]
    fn derive_maps_vendor_spaces_to_dashes() {
        let p = Path::new("profiles/Dragino/Dragino-Tech-LHT65.yaml");
        assert_eq!(derive_model(p, Some("Dragino Tech")), "LHT65");
    }

    #[test]
    fn derive_falls_back_to_parent_directory() {
        let p = Path::new("profiles/Acme/Acme-RS10.yaml");
        assert_eq!(derive_model(p, None), "RS10");
        assert_eq!(derive_model(p, Some("Other")), "RS10");
    }

    #[test]
    fn derive_without_prefix_uses_stem() {
        assert_eq!(derive_model(Path::new("x/RS10.yaml"), Some("Acme")), "RS10");
    }

    #[test]
    fn bare_vendor_stem_is_not_stripped() {
        assert_eq!(derive_model(Path::new("Acme/Acme-.yaml"), Some("Acme")), "Acme-");
    }

    fn profile() -> Value {
        json!({
            "vendor": "Acme",
            "model": "RS10",
            "datatype": {
                "1": {"name": "Temperature", "channel": 1},
                "2": {"name": "Humidity"}
            }
        })
    }

    #[test]
    fn well_named_profile_passes() {
        let r = check_naming(Path::new("profiles/Acme/Acme-RS10.yaml"), &profile());
        assert!(r.valid, "{:?}", r.errors);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn wrong_extension_and_prefix() {
        let r = check_naming(Path::new("profiles/Acme/RS10.json"), &profile());
        assert_eq!(r.errors.len(), 2, "{:?}", r.errors);
    }

    #[test]
    fn model_mismatch_is_a_warning() {
        let r = check_naming(Path::new("profiles/Acme/Acme-RS11.yaml"), &profile());
        assert!(r.valid);
        assert_eq!(r.warnings.len(), 1);
        assert!(r.warnings[0].contains("RS11"));
    }

    #[test]
    fn bad_channel_keys_and_echoes() {
        let doc = json!({
            "vendor": "Acme",
            "model": "RS10",
            "datatype": {
                "0": {"name": "Zero"},
                "2": {"name": "Two", "channel": 3}
            }
        });
        let r = check_naming(Path::new("Acme/Acme-RS10.yaml"), &doc);
        assert_eq!(r.errors.len(), 2, "{:?}", r.errors);
        assert!(r.errors[0].contains("positive integer"));
        assert!(r.errors[1].contains("does not match"));
    }

    #[test]
    fn duplicate_channel_names() {
        let doc = json!({
            "vendor": "Acme",
            "datatype": {
                "1": {"name": "Temperature"},
                "2": {"name": "Temperature"}
            }
        });
        let r = check_naming(Path::new("Acme/Acme-RS10.yaml"), &doc);
        assert_eq!(r.errors, vec![
            "datatype.2: duplicate channel name \"Temperature\" (also datatype.1)".to_string()
        ]);
    }
}
