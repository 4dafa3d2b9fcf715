//! The `generate` subcommand: rebuild the lockfile through npm.

use anyhow::{Context, Result};
use lockstep_core::{regenerate, RegenerateOptions, SHRINKWRAP_FILE};
use std::path::PathBuf;

/// Options for the `generate` subcommand.
#[derive(Debug)]
pub struct GenerateOptions {
    /// Project root the package manager runs in.
    pub root: PathBuf,
    /// Keep `node_modules` and regenerate only the lockfile.
    pub fast: bool,
}

/// Regenerate the lockfile for the project at the configured root.
pub fn run(options: &GenerateOptions) -> Result<()> {
    regenerate(&options.root, &RegenerateOptions { fast: options.fast })
        .with_context(|| format!("failed to regenerate lockfile in {}", options.root.display()))?;

    println!("regenerated {SHRINKWRAP_FILE}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let options = GenerateOptions {
            root: dir.path().join("no-such-project"),
            fast: false,
        };

        let err = run(&options).unwrap_err();
        assert!(err.to_string().contains("failed to regenerate"));
    }
}
