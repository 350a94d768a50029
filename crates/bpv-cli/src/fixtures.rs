//! # Fixtures Subcommand
//!
//! Generates `expected-output.json` entries by decoding a profile's test
//! cases. Review the output before committing it: it records what the codec
//! does today, not what it should do.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpv_core::EXPECTED_OUTPUT_FILE;
use bpv_validate::{
    generate_expected_output, load_expected_output, merge_expected_output, write_expected_output,
};
use clap::{Args, Subcommand};

use crate::output::print_json;
use crate::{CliContext, EXIT_OK};

/// Arguments for the `bpv fixtures` subcommand.
#[derive(Args, Debug)]
pub struct FixturesArgs {
    #[command(subcommand)]
    pub command: FixturesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FixturesCommand {
    /// Decode every applicable test case and emit expected output.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Profile whose test cases to decode.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Merge into the fixture folder's expected-output.json instead of
    /// printing.
    #[arg(long)]
    pub write: bool,
}

/// Execute the fixtures subcommand.
pub fn run_fixtures(args: &FixturesArgs, ctx: &CliContext) -> Result<u8> {
    match &args.command {
        FixturesCommand::Generate(generate) => run_generate(generate, ctx),
    }
}

fn run_generate(args: &GenerateArgs, ctx: &CliContext) -> Result<u8> {
    let profile = ctx.resolve(&args.file);
    let validator = ctx.validator(None)?;
    let generated = generate_expected_output(&profile, &validator)
        .with_context(|| format!("failed to generate expected output for {}", profile.display()))?;

    if !args.write {
        print_json(&generated)?;
        return Ok(EXIT_OK);
    }

    let target = ctx.config.fixtures_path(&profile).join(EXPECTED_OUTPUT_FILE);
    let count = generated.test_cases.len();
    let existing = load_expected_output(&target)?;
    let merged = merge_expected_output(existing, generated);
    write_expected_output(&target, &merged)?;
    println!("Wrote {count} case(s) to {}", target.display());
    tracing::info!(path = %target.display(), cases = count, "expected output written");
    Ok(EXIT_OK)
}
