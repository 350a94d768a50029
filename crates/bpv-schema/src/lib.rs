//! # bpv-schema: Profile Loading & Schema Validation
//!
//! Turns profile files into JSON value trees and checks them against the
//! repository's JSON Schemas.
//!
//! ## Loading (`loader`)
//!
//! [`load_profile`] reads a YAML profile and converts it to a
//! `serde_json::Value`, keeping numeric channel keys as strings. Parse
//! failures are typed [`LoadError`]s; the pipeline turns them into a
//! failed `yaml` stage.
//!
//! ## Schema Validation (`validate`)
//!
//! [`SchemaValidator`] compiles `profile.schema.json` and
//! `registry.schema.json` once, from the copies embedded at build time or
//! from a directory override, and reports each violation as
//! `<instance path>: <message>`.
//!
//! ## Crate Policy
//!
//! - Depends only on `bpv-core` internally.
//! - Checks return `ValidationResult`; only loading and compilation return `Err`.

pub mod loader;
pub mod validate;

pub use loader::{load_profile, parse_profile, yaml_to_json_value, LoadError, ProfileDocument};
pub use validate::{SchemaValidationError, SchemaValidator, Violation, PROFILE_SCHEMA, REGISTRY_SCHEMA};
