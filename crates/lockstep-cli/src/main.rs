//! lockstep - keep package.json and its lockfile in agreement

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod generate;
mod validate;

/// The documents disagree: at least one violation was reported.
const EXIT_VIOLATIONS: u8 = 1;
/// A document could not be located, read, or parsed.
const EXIT_DOCUMENT_ERROR: u8 = 2;
/// Lockfile regeneration failed.
const EXIT_REGENERATE_ERROR: u8 = 3;

#[derive(Debug, Parser)]
#[command(name = "lockstep")]
#[command(version)]
#[command(about = "Check npm lockfiles against package.json", long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check every declared dependency against the lockfile
    Validate {
        /// Project root directory
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Manifest path (defaults to package.json under the root)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Lockfile path (defaults to npm-shrinkwrap.json, then
        /// package-lock.json, under the root)
        #[arg(long)]
        lockfile: Option<PathBuf>,

        /// Output violations as structured JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Regenerate the lockfile through npm
    Generate {
        /// Project root directory
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Keep node_modules and regenerate only the lockfile
        #[arg(long, default_value_t = false)]
        fast: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            root,
            manifest,
            lockfile,
            json,
        } => {
            let options = validate::ValidateOptions {
                root,
                manifest,
                lockfile,
                json,
            };
            match validate::run(&options) {
                Ok(violations) if violations.is_empty() => ExitCode::SUCCESS,
                Ok(_) => ExitCode::from(EXIT_VIOLATIONS),
                Err(err) => {
                    eprintln!("error: {err:#}");
                    ExitCode::from(EXIT_DOCUMENT_ERROR)
                }
            }
        }

        Commands::Generate { root, fast } => {
            let options = generate::GenerateOptions { root, fast };
            match generate::run(&options) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("error: {err:#}");
                    ExitCode::from(EXIT_REGENERATE_ERROR)
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOCKSTEP_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();
}
