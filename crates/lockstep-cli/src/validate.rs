//! The `validate` subcommand: load both documents and report violations.

use anyhow::{Context, Result};
use lockstep_core::{validate, Lockfile, Manifest, Violation, MANIFEST_FILE};
use std::path::PathBuf;

/// Options for the `validate` subcommand.
#[derive(Debug)]
pub struct ValidateOptions {
    /// Project root used to locate documents not given explicitly.
    pub root: PathBuf,
    /// Explicit manifest path, overriding discovery under the root.
    pub manifest: Option<PathBuf>,
    /// Explicit lockfile path, overriding discovery under the root.
    pub lockfile: Option<PathBuf>,
    /// Emit the report as JSON instead of plain lines.
    pub json: bool,
}

/// Load manifest and lockfile, cross-check them, and print the report.
///
/// Returns the violations so the caller can pick the exit code. Loading
/// failures are errors; violations are not.
pub fn run(options: &ValidateOptions) -> Result<Vec<Violation>> {
    let manifest_path = match &options.manifest {
        Some(path) => path.clone(),
        None => options.root.join(MANIFEST_FILE),
    };
    let lockfile_path = match &options.lockfile {
        Some(path) => path.clone(),
        None => Lockfile::locate(&options.root)?,
    };

    let manifest = Manifest::from_path(&manifest_path)
        .with_context(|| format!("failed to load {}", manifest_path.display()))?;
    let lockfile = Lockfile::from_path(&lockfile_path)
        .with_context(|| format!("failed to load {}", lockfile_path.display()))?;

    let violations = validate(&manifest, &lockfile);
    report(&violations, options.json)?;

    Ok(violations)
}

/// Print the report to stdout, one line per violation or a JSON array.
fn report(violations: &[Violation], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(violations)?);
        return Ok(());
    }

    if violations.is_empty() {
        println!("lockfile is up to date");
    } else {
        for violation in violations {
            println!("{violation}");
        }
        eprintln!("found {} violation(s)", violations.len());
    }

    Ok(())
}
