//! # Registry Subcommand
//!
//! `update` rebuilds `registry.json` from the profiles tree; `check`
//! verifies an existing one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpv_registry::{build_registry, check_registry, write_registry};
use bpv_schema::SchemaValidator;
use chrono::Utc;
use clap::{Args, Subcommand};

use crate::{CliContext, EXIT_FAILED, EXIT_OK};

/// Arguments for the `bpv registry` subcommand.
#[derive(Args, Debug)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommand,
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Rebuild the registry from the profiles tree.
    Update {
        /// Root of the profiles tree.
        #[arg(long, value_name = "DIR", default_value = "profiles")]
        profiles: PathBuf,

        /// Where to write the registry.
        #[arg(long, value_name = "FILE", default_value = "registry.json")]
        output: PathBuf,
    },

    /// Check the registry against its schema and the profiles tree.
    Check {
        #[arg(long, value_name = "DIR", default_value = "profiles")]
        profiles: PathBuf,

        #[arg(long, value_name = "FILE", default_value = "registry.json")]
        registry: PathBuf,

        /// Directory holding registry.schema.json, instead of the built-in schemas.
        #[arg(long, value_name = "DIR")]
        schema_dir: Option<PathBuf>,
    },
}

/// Execute the registry subcommand.
pub fn run_registry(args: &RegistryArgs, ctx: &CliContext) -> Result<u8> {
    match &args.command {
        RegistryCommand::Update { profiles, output } => {
            run_update(&ctx.resolve(profiles), &ctx.repo_root.join(output), ctx)
        }
        RegistryCommand::Check {
            profiles,
            registry,
            schema_dir,
        } => run_check(
            &ctx.resolve(profiles),
            &ctx.resolve(registry),
            schema_dir.as_deref(),
            ctx,
        ),
    }
}

fn run_update(profiles: &Path, output: &Path, ctx: &CliContext) -> Result<u8> {
    let validator = ctx.validator(None)?;
    let registry = build_registry(profiles, &validator, Utc::now());
    write_registry(output, &registry)?;

    println!(
        "Registry: {} profiles ({} with tests, {} without) written to {}",
        registry.total_profiles,
        registry.statistics.with_tests,
        registry.statistics.without_tests,
        output.display()
    );
    for (vendor, count) in &registry.statistics.by_vendor {
        println!("  {vendor}: {count}");
    }
    Ok(EXIT_OK)
}

fn run_check(
    profiles: &Path,
    registry: &Path,
    schema_dir: Option<&Path>,
    ctx: &CliContext,
) -> Result<u8> {
    let schema = match schema_dir {
        Some(dir) => SchemaValidator::new(ctx.resolve(dir))
            .with_context(|| format!("failed to load schemas from {}", dir.display()))?,
        None => SchemaValidator::builtin().context("failed to compile built-in schemas")?,
    };
    let result = check_registry(registry, profiles, &schema, &ctx.config.excluded_dirs)?;

    for error in &result.errors {
        println!("  FAIL: {error}");
    }
    for warning in &result.warnings {
        println!("  WARN: {warning}");
    }
    if result.valid {
        println!("Registry {} is valid", registry.display());
        Ok(EXIT_OK)
    } else {
        println!(
            "\nRegistry {} has {} error(s); run `bpv registry update`",
            registry.display(),
            result.errors.len()
        );
        Ok(EXIT_FAILED)
    }
}
