//! Lockfile regeneration through the package manager.
//!
//! This is the mutating counterpart to validation: it removes stale
//! dependency state and asks npm to recompute the lockfile from the
//! manifest. Everything here shells out; the validator never does.

use crate::lockfile::SHRINKWRAP_FILE;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::info;

/// Directory npm installs resolved packages into.
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Failure while regenerating the lockfile.
///
/// Regeneration is fatal-on-first-failure: there is no retry and no
/// recovery of partially removed state. The underlying cause is always
/// attached.
#[derive(Error, Debug)]
pub enum RegenerateError {
    /// The project root does not exist or is not a directory.
    #[error("project root {0} does not exist or is not a directory")]
    MissingRoot(PathBuf),

    /// Removing stale state from disk failed.
    #[error(
        "failed to remove {path}; often caused by a file lock held by an \
         editor, shell, or watcher process"
    )]
    Remove {
        /// What was being removed.
        path: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// The package manager could not be launched at all.
    #[error("failed to launch '{command}'")]
    Launch {
        /// The command line that was attempted.
        command: String,
        /// The underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// The package manager ran but reported failure.
    #[error("'{command}' failed: {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Knobs for [`regenerate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegenerateOptions {
    /// Keep `node_modules` in place and regenerate only the lockfile.
    pub fast: bool,
}

/// Regenerate the lockfile for the project at `root`.
///
/// Unless `fast` is set, the `node_modules` directory is removed first so
/// the package manager resolves from a clean slate. The existing
/// `npm-shrinkwrap.json` is always removed, then `npm update` and
/// `npm shrinkwrap` are run in `root` to produce a fresh one.
///
/// # Errors
///
/// Returns an error if `root` is not a directory, if removal of stale
/// state fails, or if either npm invocation cannot be launched or exits
/// unsuccessfully. The first failure aborts the sequence.
pub fn regenerate(root: impl AsRef<Path>, options: &RegenerateOptions) -> Result<(), RegenerateError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(RegenerateError::MissingRoot(root.to_path_buf()));
    }

    let node_modules = root.join(NODE_MODULES_DIR);
    if node_modules.exists() && !options.fast {
        info!("removing cached dependency state {}", node_modules.display());
        remove_path(&node_modules)?;
    }

    let shrinkwrap = root.join(SHRINKWRAP_FILE);
    if shrinkwrap.exists() {
        info!("removing stale lockfile {}", shrinkwrap.display());
        remove_path(&shrinkwrap)?;
    }

    run_npm(root, "update")?;
    run_npm(root, "shrinkwrap")?;

    Ok(())
}

/// Remove a file or directory tree.
fn remove_path(path: &Path) -> Result<(), RegenerateError> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result.map_err(|source| RegenerateError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Run one npm subcommand in `root` and wait for it to finish.
fn run_npm(root: &Path, subcommand: &str) -> Result<(), RegenerateError> {
    let command = format!("{} {subcommand}", npm_program());
    info!("running {command}");

    let output = Command::new(npm_program())
        .arg(subcommand)
        .current_dir(root)
        .output()
        .map_err(|source| RegenerateError::Launch {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        return Err(RegenerateError::CommandFailed { command, stderr });
    }

    Ok(())
}

/// npm is a `.cmd` shim on Windows and cannot be spawned by its bare name.
fn npm_program() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn remove_path_deletes_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("victim.txt");
        fs::write(&file, "x").unwrap();

        remove_path(&file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn remove_path_deletes_a_directory_tree() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("node_modules");
        fs::create_dir_all(tree.join("left-pad")).unwrap();
        fs::write(tree.join("left-pad").join("index.js"), "x").unwrap();

        remove_path(&tree).unwrap();
        assert!(!tree.exists());
    }

    #[test]
    fn remove_path_reports_the_failing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("never-existed");

        let err = remove_path(&missing).unwrap_err();
        match &err {
            RegenerateError::Remove { path, .. } => assert_eq!(path, &missing),
            other => panic!("expected Remove, got {other:?}"),
        }
        assert!(err.to_string().contains("file lock"));
    }

    #[test]
    fn missing_root_is_rejected_before_any_removal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("no-such-project");

        let err = regenerate(&root, &RegenerateOptions::default()).unwrap_err();
        assert!(matches!(err, RegenerateError::MissingRoot(_)));
    }

    #[test]
    fn options_default_to_a_full_regeneration() {
        assert!(!RegenerateOptions::default().fast);
    }
}
