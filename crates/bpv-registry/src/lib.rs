//! # bpv-registry: Profile Index
//!
//! Builds, writes and checks `registry.json`, the catalogue of every
//! profile in the tree.
//!
//! ## Crate Policy
//!
//! - The build step never fails on a bad profile: it is skipped with a
//!   warning, or listed with `verified: false` when it loads but does not
//!   validate.
//! - The build time is passed in, so output is reproducible in tests.

pub mod device_type;
pub mod error;
pub mod registry;

pub use device_type::{classify_device_type, DeviceType};
pub use error::RegistryError;
pub use registry::{
    build_registry, check_registry, read_registry, write_registry, Registry, RegistryEntry,
    Statistics, REGISTRY_VERSION,
};
