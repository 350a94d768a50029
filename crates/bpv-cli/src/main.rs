//! # bpv CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bpv_cli::batch::{run_batch_command, BatchArgs};
use bpv_cli::codec::{run_codec, CodecArgs};
use bpv_cli::fixtures::{run_fixtures, FixturesArgs};
use bpv_cli::registry::{run_registry, RegistryArgs};
use bpv_cli::validate::{run_validate, ValidateArgs};
use bpv_cli::{find_repo_root, load_config, CliContext, EXIT_ERROR};

/// BACnet profile validator.
///
/// Checks LoRaWAN device profiles (YAML) for schema conformance, required
/// fields, BACnet object types and naming, runs their embedded codecs
/// against fixtures, and maintains the profile registry.
#[derive(Parser, Debug)]
#[command(name = "bpv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a single profile.
    Validate(ValidateArgs),

    /// Validate every profile under a directory.
    Batch(BatchArgs),

    /// Run a profile's codec on a payload or on a fixture folder.
    Codec(CodecArgs),

    /// Generate expected output from test data.
    Fixtures(FixturesArgs),

    /// Build or check registry.json.
    Registry(RegistryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, takes precedence over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "bpv starting");

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let repo_root = find_repo_root(&cwd).unwrap_or_else(|| {
        tracing::debug!("no repository root found; using current directory");
        cwd.clone()
    });
    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let ctx = CliContext::new(repo_root, config);

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &ctx),
        Commands::Batch(args) => run_batch_command(&args, &ctx),
        Commands::Codec(args) => run_codec(&args, &ctx),
        Commands::Fixtures(args) => run_fixtures(&args, &ctx),
        Commands::Registry(args) => run_registry(&args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
