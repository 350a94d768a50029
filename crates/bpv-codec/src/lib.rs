//! # bpv-codec: Codec Sandbox
//!
//! Profiles embed a JavaScript codec that turns raw LoRaWAN uplink bytes
//! into named channel values. This crate runs those scripts in an
//! embedded interpreter (`boa_engine`) with no host access and bounded
//! execution, and hands results back as `serde_json` values.
//!
//! The decode contract: `decodeUplink({bytes, fPort, variables})` returns
//! an array of `{name, channel, value, unit}` records. The optional
//! `encodeDownlink({data, variables})` returns an array of byte values.
//!
//! ## Crate Policy
//!
//! - Depends only on `bpv-core` internally.
//! - No interpreter state is shared between calls.

pub mod error;
pub mod sandbox;

pub use error::SandboxError;
pub use sandbox::{CodecInspection, CodecSandbox, DownlinkInput, SandboxConfig, UplinkInput};
