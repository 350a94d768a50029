//! # Profile Data Model
//!
//! A profile is one YAML file describing how a LoRaWAN device's payloads
//! map onto BACnet objects: the vendor codec script, the channel table
//! (`datatype`) and the LoRaWAN parameters the gateway needs to join it.
//!
//! Validation works on the raw JSON value tree so that a malformed file can
//! still be fully diagnosed. [`Profile::from_value`] offers a lenient typed
//! view for tools that only read well-formed data (registry, CLI output):
//! fields of the wrong type are treated as absent rather than failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::object_type::ObjectType;

/// Top-level keys whose absence (or emptiness) is a required-field error.
pub const REQUIRED_PROFILE_KEYS: [&str; 4] = ["model", "codec", "datatype", "lorawan"];

/// Canonical set of LoRaWAN parameters every profile must declare.
pub const REQUIRED_LORAWAN_KEYS: [&str; 5] = [
    "macVersion",
    "region",
    "supportOTAA",
    "supportClassB",
    "supportClassC",
];

/// Typed view of a profile document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Optional stable identifier.
    pub id: Option<String>,
    /// Human-readable device name.
    pub name: Option<String>,
    /// Device model, e.g. `RAK7204`.
    pub model: Option<String>,
    /// Device vendor, e.g. `RAKwireless`.
    pub vendor: Option<String>,
    /// Semantic version of the profile itself.
    pub profile_version: Option<String>,
    /// Codec script source.
    pub codec: Option<String>,
    /// Channel table keyed by numeric-string channel id.
    pub datatype: BTreeMap<String, ChannelSpec>,
    /// LoRaWAN parameters.
    pub lorawan: LorawanParams,
}

/// One channel of the `datatype` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSpec {
    /// Display label, also the BACnet object name.
    pub name: Option<String>,
    /// Declared object type, kept verbatim so unsupported spellings survive.
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    /// Engineering units.
    pub units: Option<String>,
    /// COV threshold.
    pub cov_increment: Option<f64>,
    /// Expected reporting interval in seconds.
    pub update_interval: Option<u64>,
    /// Redundant echo of the channel key.
    pub channel: Option<i64>,
}

/// LoRaWAN parameter record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LorawanParams {
    pub mac_version: Option<String>,
    pub region: Option<String>,
    pub adr_algorithm: Option<String>,
    #[serde(rename = "supportOTAA")]
    pub support_otaa: Option<bool>,
    pub support_class_b: Option<bool>,
    pub support_class_c: Option<bool>,
    pub downlink_timeout: Option<u64>,
    /// Any parameter not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Profile {
    /// Build a typed view from a parsed profile document.
    ///
    /// Never fails: anything that is missing or has the wrong JSON type
    /// becomes `None` (or an empty table).
    pub fn from_value(value: &Value) -> Self {
        let datatype = value
            .get("datatype")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), ChannelSpec::from_value(v)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: str_field(value, "id"),
            name: str_field(value, "name"),
            model: str_field(value, "model"),
            vendor: str_field(value, "vendor"),
            profile_version: str_field(value, "profileVersion"),
            codec: str_field(value, "codec"),
            datatype,
            lorawan: value
                .get("lorawan")
                .map(LorawanParams::from_value)
                .unwrap_or_default(),
        }
    }
}

impl ChannelSpec {
    fn from_value(value: &Value) -> Self {
        Self {
            name: str_field(value, "name"),
            object_type: str_field(value, "type"),
            units: str_field(value, "units"),
            cov_increment: value.get("covIncrement").and_then(Value::as_f64),
            update_interval: value.get("updateInterval").and_then(Value::as_u64),
            channel: value.get("channel").and_then(Value::as_i64),
        }
    }

    /// The declared type, if it is one of the supported kinds.
    pub fn parsed_type(&self) -> Option<ObjectType> {
        self.object_type.as_deref().and_then(|t| t.parse().ok())
    }
}

impl LorawanParams {
    fn from_value(value: &Value) -> Self {
        const MODELLED: [&str; 7] = [
            "macVersion",
            "region",
            "adrAlgorithm",
            "supportOTAA",
            "supportClassB",
            "supportClassC",
            "downlinkTimeout",
        ];
        let extra = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter(|(k, _)| !MODELLED.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            mac_version: scalar_text(value, "macVersion"),
            region: str_field(value, "region"),
            adr_algorithm: scalar_text(value, "adrAlgorithm"),
            support_otaa: value.get("supportOTAA").and_then(Value::as_bool),
            support_class_b: value.get("supportClassB").and_then(Value::as_bool),
            support_class_c: value.get("supportClassC").and_then(Value::as_bool),
            downlink_timeout: value.get("downlinkTimeout").and_then(Value::as_u64),
            extra,
        }
    }

    /// Highest LoRaWAN device class the profile supports: `C`, `B` or `A`.
    pub fn device_class(&self) -> &'static str {
        if self.support_class_c == Some(true) {
            "C"
        } else if self.support_class_b == Some(true) {
            "B"
        } else {
            "A"
        }
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

// macVersion is sometimes written unquoted (e.g. `1.0`), which YAML reads as a number.
fn scalar_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
