//! Keyword classification of a device into a coarse category.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse device category shown in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Water,
    Air,
    Climate,
    Binary,
    Location,
    Energy,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Air => "air",
            Self::Climate => "climate",
            Self::Binary => "binary",
            Self::Location => "location",
            Self::Energy => "energy",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories in priority order. The first one with a matching keyword wins.
const KEYWORDS: [(DeviceType, &[&str]); 6] = [
    (DeviceType::Water, &["water", "leak", "flood", "moisture"]),
    (DeviceType::Air, &["co2", "air quality", "iaq", "gas"]),
    (
        DeviceType::Climate,
        &["temperature", "humidity", "th", "climate", "weather"],
    ),
    (
        DeviceType::Binary,
        &["binary", "button", "switch", "door", "window"],
    ),
    (
        DeviceType::Location,
        &["gps", "location", "tracker", "position", "geolocation"],
    ),
    (
        DeviceType::Energy,
        &["power", "energy", "current", "voltage", "electricity"],
    ),
];

/// Classify a device from its display name and model.
///
/// Single-word keywords match whole words, or a word followed only by
/// digits (`TH10` is climate, `Bath` is not). Multi-word keywords match as
/// phrases.
pub fn classify_device_type(name: &str, model: &str) -> DeviceType {
    let text = format!("{name} {model}").to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let matches = |keyword: &str| {
        if keyword.contains(' ') {
            return text.contains(keyword);
        }
        words.iter().any(|w| {
            w.strip_prefix(keyword)
                .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
        })
    };

    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| matches(k)))
        .map(|(category, _)| *category)
        .unwrap_or(DeviceType::Other)
}
