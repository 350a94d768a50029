//! # Codec Subcommand
//!
//! Runs a profile's codec outside the full pipeline: decode one uplink,
//! encode one downlink, or run the profile's fixture cases from a given
//! folder.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bpv_codec::{CodecSandbox, DownlinkInput, SandboxConfig, UplinkInput};
use bpv_core::{extract_hex_bytes, parse_hex_payload, HexError, ValidationResult};
use bpv_schema::load_profile;
use bpv_validate::{derive_model, run_profile_tests, TestRunReport};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::output::{print_json, print_test_run};
use crate::{CliContext, EXIT_FAILED, EXIT_OK};

/// Arguments for the `bpv codec` subcommand.
#[derive(Args, Debug)]
pub struct CodecArgs {
    /// Profile whose codec to run.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// LoRaWAN fPort of the uplink.
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u8>,

    /// Uplink payload as hex. Free text containing a byte run such as
    /// "01 64 00 C8" is also accepted.
    #[arg(short = 'u', long = "uplink", value_name = "HEX", conflicts_with = "encode")]
    pub uplink: Option<String>,

    /// Downlink data as JSON, passed to encodeDownlink.
    #[arg(long, value_name = "JSON")]
    pub encode: Option<String>,

    /// Run every fixture case in FIXTURES against FILE's codec.
    #[arg(
        long,
        num_args = 2,
        value_names = ["FILE", "FIXTURES"],
        conflicts_with_all = ["file", "uplink", "encode"]
    )]
    pub batch: Option<Vec<PathBuf>>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the codec subcommand.
pub fn run_codec(args: &CodecArgs, ctx: &CliContext) -> Result<u8> {
    let sandbox = CodecSandbox::new(SandboxConfig::from(&ctx.config));

    if let Some(batch) = &args.batch {
        let [profile, fixtures] = batch.as_slice() else {
            bail!("--batch takes a profile file and a fixtures folder");
        };
        return run_fixture_cases(&ctx.resolve(profile), &ctx.resolve(fixtures), &sandbox, args.json);
    }

    let Some(file) = &args.file else {
        bail!("no profile given; use -f FILE, or --batch FILE FIXTURES");
    };
    let path = ctx.resolve(file);
    let doc = load_profile(&path)?;
    let Some(source) = doc.value.get("codec").and_then(Value::as_str) else {
        bail!("{} has no codec", path.display());
    };

    if let Some(data) = &args.encode {
        let data: Value = serde_json::from_str(data).context("--encode must be valid JSON")?;
        return match sandbox.encode(source, &DownlinkInput::new(data)) {
            Ok(bytes) => {
                if args.json {
                    print_json(&bytes)?;
                } else {
                    println!("Downlink: {}", to_hex(&bytes));
                }
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("FAIL: {e}");
                Ok(EXIT_FAILED)
            }
        };
    }

    let Some(uplink) = &args.uplink else {
        bail!("nothing to run; pass -u HEX or --encode JSON");
    };
    let Some(port) = args.port else {
        bail!("decoding an uplink needs its fPort (-p PORT)");
    };
    let bytes = uplink_bytes(uplink).context("invalid uplink payload")?;
    tracing::debug!(bytes = bytes.len(), port, "decoding uplink");

    match sandbox.decode(source, &UplinkInput::new(bytes, port)) {
        Ok(records) => {
            if args.json {
                print_json(&records)?;
            } else {
                for record in &records {
                    println!("{}", describe_record(record));
                }
            }
            Ok(EXIT_OK)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(EXIT_FAILED)
        }
    }
}

#[derive(Serialize)]
struct FixtureRun<'a> {
    result: &'a ValidationResult,
    tests: Option<&'a TestRunReport>,
}

fn run_fixture_cases(
    profile: &Path,
    fixtures: &Path,
    sandbox: &CodecSandbox,
    json: bool,
) -> Result<u8> {
    let doc = load_profile(profile)?;
    let vendor = doc.value.get("vendor").and_then(Value::as_str);
    let model = derive_model(profile, vendor);
    let (result, report) = run_profile_tests(&doc.value, fixtures, &model, sandbox);

    if json {
        print_json(&FixtureRun {
            result: &result,
            tests: report.as_ref(),
        })?;
    } else {
        if let Some(report) = &report {
            print_test_run(report);
        }
        for error in &result.errors {
            println!("  - {error}");
        }
        for warning in &result.warnings {
            println!("  ! {warning}");
        }
    }
    Ok(if result.valid { EXIT_OK } else { EXIT_FAILED })
}

/// Hex payload, or the first byte run found in free text.
fn uplink_bytes(text: &str) -> Result<Vec<u8>, HexError> {
    parse_hex_payload(text).or_else(|first| match extract_hex_bytes(text) {
        Ok(run) => parse_hex_payload(&run),
        Err(_) => Err(first),
    })
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `ch<channel> <name> = <value> <unit>` for a decoded record.
fn describe_record(record: &Value) -> String {
    let field = |key: &str| match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    format!(
        "  ch{} {} = {} {}",
        field("channel"),
        field("name"),
        field("value"),
        field("unit")
    )
    .trim_end()
    .to_string()
}
