//! # Batch Subcommand
//!
//! Validates every profile under a directory, or the files named in a list.
//! Fixture tests are skipped unless `--with-tests` is given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use bpv_validate::{
    read_file_list, run_batch, scan_profiles, ScanConfig, ScanMode, ValidateOptions,
};

use crate::output::{print_batch_report, print_json};
use crate::{CliContext, EXIT_FAILED, EXIT_OK};

/// Arguments for the `bpv batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Root of the profiles tree.
    #[arg(value_name = "DIR", default_value = "profiles")]
    pub dir: PathBuf,

    /// Print the full batch report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also run fixture decode tests for every profile.
    #[arg(long)]
    pub with_tests: bool,

    /// Only look at `<DIR>/<Vendor>/*.yaml`.
    #[arg(long)]
    pub one_level: bool,

    /// Validate the profile paths listed in this file, one per line,
    /// instead of scanning.
    #[arg(long, value_name = "FILE", conflicts_with = "one_level")]
    pub list: Option<PathBuf>,

    /// Warn about analog channels without units and channels without updateInterval.
    #[arg(long)]
    pub warn_metadata: bool,
}

/// Execute the batch subcommand.
///
/// Returns exit code 1 when any profile fails, or when no profiles were found.
pub fn run_batch_command(args: &BatchArgs, ctx: &CliContext) -> Result<u8> {
    let root = ctx.resolve(&args.dir);

    let files = match &args.list {
        Some(list) => {
            let list = ctx.resolve(list);
            read_file_list(&list)
                .with_context(|| format!("failed to read file list {}", list.display()))?
                .into_iter()
                .map(|p| ctx.resolve(&p))
                .collect()
        }
        None => {
            let mode = if args.one_level {
                ScanMode::OneLevel
            } else {
                ScanMode::Recursive
            };
            scan_profiles(&ScanConfig::new(&root, &ctx.config).with_mode(mode))
        }
    };

    if files.is_empty() {
        println!("No profiles found under {}", root.display());
        return Ok(EXIT_FAILED);
    }

    tracing::info!(count = files.len(), "validating profiles");
    let validator = ctx.validator(None)?;
    let options = ValidateOptions {
        run_tests: args.with_tests,
        metadata_warnings: args.warn_metadata || ctx.config.metadata_warnings,
    };
    let report = run_batch(&files, &validator, &options);

    if args.json {
        print_json(&report)?;
    } else {
        print_batch_report(&report, &ctx.repo_root);
    }

    Ok(if report.is_success() { EXIT_OK } else { EXIT_FAILED })
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

    fn args(dir: PathBuf) -> BatchArgs {
        BatchArgs {
            dir,
            json: true,
            with_tests: false,
            one_level: false,
            list: None,
            warn_metadata: false,
        }
    }

    fn ctx(root: &std::path::Path) -> CliContext {
        CliContext::new(root.to_path_buf(), ValidatorConfig::default())
    }

    #[test]
    fn empty_tree_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            run_batch_command(&args(dir.path().to_path_buf()), &ctx(dir.path())).unwrap(),
            EXIT_FAILED
        );
    }

    #[test]
    fn passing_tree_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let vendor = dir.path().join("Acme");
        std::fs::create_dir_all(&vendor).unwrap();
        std::fs::write(vendor.join("Acme-T1.yaml"), PROFILE).unwrap();
        assert_eq!(
            run_batch_command(&args(dir.path().to_path_buf()), &ctx(dir.path())).unwrap(),
            EXIT_OK
        );
    }

    #[test]
    fn list_file_selects_profiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Acme-T1.yaml"), PROFILE).unwrap();
        std::fs::write(
            dir.path().join("Acme-T2.yaml"),
            PROFILE.replace("model: T1", "model: T2").replace("AnalogInputObject", "Dial"),
        )
        .unwrap();
        let list = dir.path().join("changed.txt");
        std::fs::write(&list, "Acme-T1.yaml\nnotes.md\n").unwrap();

        let mut a = args(dir.path().to_path_buf());
        a.list = Some(list);
        assert_eq!(run_batch_command(&a, &ctx(dir.path())).unwrap(), EXIT_OK);
    }

    #[test]
    fn missing_list_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(dir.path().to_path_buf());
        a.list = Some(dir.path().join("absent.txt"));
        assert!(run_batch_command(&a, &ctx(dir.path())).is_err());
    }
}
