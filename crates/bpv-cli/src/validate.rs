//! # Validate Subcommand
//!
//! Runs every stage against a single profile and prints the report.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use bpv_validate::ValidateOptions;

use crate::output::{print_json, print_profile_report};
use crate::{CliContext, EXIT_ERROR, EXIT_FAILED, EXIT_OK};

/// Arguments for the `bpv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Profile file to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Skip fixture decode tests.
    #[arg(long)]
    pub no_tests: bool,

    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Warn about analog channels without units and channels without updateInterval.
    #[arg(long)]
    pub warn_metadata: bool,

    /// Directory with profile.schema.json, instead of the built-in schemas.
    #[arg(long, value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure, 2 when the
/// profile file does not exist.
pub fn run_validate(args: &ValidateArgs, ctx: &CliContext) -> Result<u8> {
    let path = ctx.resolve(&args.file);
    if !path.is_file() {
        eprintln!("error: profile not found: {}", path.display());
        return Ok(EXIT_ERROR);
    }

    let validator = ctx.validator(args.schema_dir.as_deref())?;
    let options = ValidateOptions {
        run_tests: !args.no_tests,
        metadata_warnings: args.warn_metadata || ctx.config.metadata_warnings,
    };
    let report = validator.validate_file(&path, &options);

    if args.json {
        print_json(&report)?;
    } else {
        print_profile_report(&report, &ctx.repo_root);
    }

    Ok(if report.valid { EXIT_OK } else { EXIT_FAILED })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpv_core::ValidatorConfig;

    const PROFILE: &str = r#"model: T1
vendor: Acme
codec: "function decodeUplink(i) { return []; }"
datatype:
  1: { name: Temperature, type: AnalogInputObject }
lorawan: { macVersion: "1.0.3", region: EU868, supportOTAA: true, supportClassB: false, supportClassC: false }
"#;

    fn args(file: PathBuf) -> ValidateArgs {
        ValidateArgs {
            file,
            no_tests: true,
            json: true,
            warn_metadata: false,
            schema_dir: None,
        }
    }

    fn ctx(root: &std::path::Path) -> CliContext {
        CliContext::new(root.to_path_buf(), ValidatorConfig::default())
    }

    #[test]
    fn valid_profile_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Acme-T1.yaml");
        std::fs::write(&file, PROFILE).unwrap();
        assert_eq!(run_validate(&args(file), &ctx(dir.path())).unwrap(), EXIT_OK);
    }

    #[test]
    fn invalid_profile_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Acme-T1.yaml");
        std::fs::write(&file, PROFILE.replace("AnalogInputObject", "Dial")).unwrap();
        assert_eq!(run_validate(&args(file), &ctx(dir.path())).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn missing_file_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Acme-None.yaml");
        assert_eq!(run_validate(&args(file), &ctx(dir.path())).unwrap(), EXIT_ERROR);
    }
}
