//! # bpv-core: Foundational Types for BACnet Profile Validation
//!
//! This crate defines the vocabulary shared by every other `bpv-*` crate:
//! what a device profile looks like, which BACnet object kinds a channel
//! may map to, how a check reports its findings, and how decoded payloads
//! are compared against fixtures. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One closed enumeration of object types.** `ObjectType` has exactly
//!    seven variants. Every `match` on it is exhaustive, so a new kind
//!    forces every consumer to handle it.
//!
//! 2. **Checks return data, not errors.** Every validation stage yields a
//!    `ValidationResult { valid, errors, warnings }`. Only I/O and parse
//!    failures surface as `Err`.
//!
//! 3. **Fixtures are plain serde types.** `test-data.json` and
//!    `expected-output.json` deserialize into `TestDataFile` and
//!    `ExpectedOutputFile` with the camelCase field names used on disk.
//!
//! 4. **Comparison is numeric-aware.** `deep_equal` treats `25` and `25.0`
//!    as the same number but never coerces strings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bpv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod compare;
pub mod config;
pub mod error;
pub mod fixture;
pub mod object_type;
pub mod payload;
pub mod profile;
pub mod result;

// Re-export primary types for ergonomic imports.
pub use compare::{deep_equal, first_difference, json_type_name, Difference};
pub use config::{ConfigError, ValidatorConfig};
pub use error::CoreError;
pub use fixture::{
    ExpectedCase, ExpectedOutputFile, TestCase, TestDataFile, EXPECTED_OUTPUT_FILE, TEST_DATA_FILE,
};
pub use object_type::{ObjectType, OBJECT_TYPE_COUNT};
pub use payload::{extract_hex_bytes, parse_hex_payload, HexError};
pub use profile::{ChannelSpec, LorawanParams, Profile, REQUIRED_LORAWAN_KEYS, REQUIRED_PROFILE_KEYS};
pub use result::{Stage, StageReport, ValidationResult};

/// Name of the codec entry point every profile must define.
pub const DECODE_ENTRY_POINT: &str = "decodeUplink";

/// Name of the optional codec entry point used for downlink control.
pub const ENCODE_ENTRY_POINT: &str = "encodeDownlink";
