//! Vaultmark CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vaultmark::{OutputFormat, ReportFormatter, Vault};

/// Vaultmark - typed markup checks for markdown vaults
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every file in a vault against its schema
    Check {
        /// Path to the vault directory
        #[arg(env = "VAULTMARK_VAULT", default_value = ".")]
        vault: PathBuf,

        /// Output format (human, json)
        #[arg(long, default_value = "human")]
        format: OutputFormat,

        /// Only report errors
        #[arg(long, action = clap::ArgAction::SetTrue)]
        errors_only: bool,

        /// Fail on warnings as well as errors
        #[arg(long, action = clap::ArgAction::SetTrue)]
        strict: bool,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    match args.command {
        Command::Check {
            vault,
            format,
            errors_only,
            strict,
        } => {
            log::info!("Vaultmark v{}", env!("CARGO_PKG_VERSION"));
            let vault = Vault::open(&vault)
                .with_context(|| format!("Failed to open vault at {}", vault.display()))?;

            let mut report = vault.check();
            let passed = report.passed_with(strict);
            if errors_only {
                report.retain_errors();
            }

            print!("{}", ReportFormatter::format(&report, format));
            Ok(if passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
