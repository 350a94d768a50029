//! # BACnet Object Types: Closed Enumeration
//!
//! Defines the seven BACnet object kinds a profile channel may be exposed
//! as by the gateway's BACnet stack. The set is closed: a channel naming
//! any other type is a hard validation error, never a warning.
//!
//! | # | Type | Direction | Value |
//! |---|------|-----------|-------|
//! | 1 | AnalogInputObject | sensor → BACnet | real |
//! | 2 | AnalogOutputObject | BACnet → device | real |
//! | 3 | AnalogValueObject | either | real |
//! | 4 | BinaryInputObject | sensor → BACnet | active/inactive |
//! | 5 | BinaryOutputObject | BACnet → device | active/inactive |
//! | 6 | BinaryValueObject | either | active/inactive |
//! | 7 | OctetStringValueObject | either | raw octets |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A BACnet object type supported by the gateway.
///
/// Serialized with the exact spelling profiles use, e.g. `"AnalogInputObject"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    /// Read-only analog measurement (temperature, humidity, ...).
    AnalogInputObject,
    /// Writable analog set-point forwarded as a downlink.
    AnalogOutputObject,
    /// Analog value without a physical direction.
    AnalogValueObject,
    /// Read-only two-state input (door contact, leak).
    BinaryInputObject,
    /// Writable two-state output (relay).
    BinaryOutputObject,
    /// Two-state value without a physical direction.
    BinaryValueObject,
    /// Opaque octet string.
    OctetStringValueObject,
}

/// Total number of supported object types.
pub const OBJECT_TYPE_COUNT: usize = 7;

impl ObjectType {
    /// All supported object types in canonical order.
    pub const ALL: [ObjectType; OBJECT_TYPE_COUNT] = [
        Self::AnalogInputObject,
        Self::AnalogOutputObject,
        Self::AnalogValueObject,
        Self::BinaryInputObject,
        Self::BinaryOutputObject,
        Self::BinaryValueObject,
        Self::OctetStringValueObject,
    ];

    /// The spelling used in profile YAML.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalogInputObject => "AnalogInputObject",
            Self::AnalogOutputObject => "AnalogOutputObject",
            Self::AnalogValueObject => "AnalogValueObject",
            Self::BinaryInputObject => "BinaryInputObject",
            Self::BinaryOutputObject => "BinaryOutputObject",
            Self::BinaryValueObject => "BinaryValueObject",
            Self::OctetStringValueObject => "OctetStringValueObject",
        }
    }

    /// Whether the object carries a real number (and so usually has units).
    pub fn is_analog(&self) -> bool {
        matches!(
            self,
            Self::AnalogInputObject | Self::AnalogOutputObject | Self::AnalogValueObject
        )
    }

    /// Comma-separated list of every supported spelling, for error messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownObjectType(s.to_string()))
    }
}
