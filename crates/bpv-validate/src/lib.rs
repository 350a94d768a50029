//! # bpv-validate: Profile Validation Pipeline
//!
//! Everything between "a YAML file on disk" and "pass or fail with reasons".
//!
//! ## Stages
//!
//! - [`fields`]: required top-level keys, channel `name`/`type`, the
//!   canonical LoRaWAN key set.
//! - [`object_types`]: channel types against the seven BACnet kinds.
//! - [`naming`]: `<Vendor>-<Model>.yaml` naming, model derivation and
//!   channel-table consistency.
//! - [`codec_check`]: the codec loads and defines `decodeUplink`.
//! - [`runner`]: fixture test cases, filtered by model and compared with
//!   their expected output.
//!
//! [`pipeline::ProfileValidator`] runs the stages for one file.
//! [`scan`] and [`batch`] find profiles and validate many at once;
//! [`fixtures`] reads fixture files and generates expected output.
//!
//! ## Crate Policy
//!
//! - Check functions return `ValidationResult` and never raise.
//! - `ValidateError` covers file and fixture I/O only.
//! - No shared mutable state: validating a file twice yields the same report.

pub mod batch;
pub mod codec_check;
pub mod error;
pub mod fields;
pub mod fixtures;
pub mod naming;
pub mod object_types;
pub mod pipeline;
pub mod runner;
pub mod scan;

pub use batch::{run_batch, BatchFailure, BatchReport};
pub use codec_check::check_codec;
pub use error::{Result, ValidateError};
pub use fields::check_required_fields;
pub use fixtures::{
    generate_expected_output, load_expected_output, load_fixtures, load_test_data,
    merge_expected_output, write_expected_output, Fixtures,
};
pub use naming::{check_naming, derive_model};
pub use object_types::check_object_types;
pub use pipeline::{ProfileReport, ProfileValidator, SkippedStage, ValidateOptions};
pub use runner::{
    run_case, run_profile_tests, select_cases, CaseOutcome, CaseReport, TestRunReport,
};
pub use scan::{is_profile_file, read_file_list, scan_profiles, ScanConfig, ScanMode};
