//! npm lockfile (`npm-shrinkwrap.json` / `package-lock.json`) parsing.
//!
//! The lockfile is the single source of truth for what will actually be
//! installed. Only the top-level `dependencies` mapping is consulted;
//! nested per-package dependency trees are ignored.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The shrinkwrap filename. Takes precedence over [`PACKAGE_LOCK_FILE`].
pub const SHRINKWRAP_FILE: &str = "npm-shrinkwrap.json";

/// The package-lock filename, consulted when no shrinkwrap is present.
pub const PACKAGE_LOCK_FILE: &str = "package-lock.json";

/// Errors that can occur when loading a lockfile.
#[derive(Error, Debug)]
pub enum LockfileError {
    #[error("lockfile not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read lockfile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse lockfile: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported lockfileVersion {0}, expected 1 or 2")]
    UnsupportedVersion(u64),
}

/// A fully resolved lockfile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lockfile {
    /// Package name, as recorded by npm.
    #[serde(default)]
    pub name: Option<String>,

    /// Package version, as recorded by npm.
    #[serde(default)]
    pub version: Option<String>,

    /// Lockfile schema revision written by npm.
    #[serde(default, rename = "lockfileVersion")]
    pub lockfile_version: Option<u64>,

    /// Resolved dependencies: package name to pinned record.
    #[serde(default)]
    pub dependencies: BTreeMap<String, LockedDependency>,
}

/// One resolved dependency record.
#[derive(Debug, Clone, Deserialize)]
pub struct LockedDependency {
    /// The exact pinned version.
    pub version: String,

    /// Tarball URL the package resolved to.
    #[serde(default)]
    pub resolved: Option<String>,

    /// Subresource integrity hash of the tarball.
    #[serde(default)]
    pub integrity: Option<String>,

    /// Whether the package was installed for development only.
    #[serde(default)]
    pub dev: bool,
}

impl Lockfile {
    /// Load a lockfile from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid JSON,
    /// or written in an unsupported lockfile revision.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LockfileError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LockfileError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a lockfile from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the document declares
    /// `lockfileVersion` 3 or later, which stores its pins under `packages`
    /// instead of `dependencies`.
    pub fn parse(content: &str) -> Result<Self, LockfileError> {
        let lockfile: Self = serde_json::from_str(content)?;
        lockfile.validate()?;
        Ok(lockfile)
    }

    /// Validate the lockfile revision.
    fn validate(&self) -> Result<(), LockfileError> {
        match self.lockfile_version {
            Some(revision) if revision >= 3 => Err(LockfileError::UnsupportedVersion(revision)),
            _ => Ok(()),
        }
    }

    /// Resolve which lock document a project root uses.
    ///
    /// npm gives `npm-shrinkwrap.json` precedence over `package-lock.json`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` naming the shrinkwrap path if neither file exists.
    pub fn locate(root: impl AsRef<Path>) -> Result<PathBuf, LockfileError> {
        let root = root.as_ref();

        let shrinkwrap = root.join(SHRINKWRAP_FILE);
        if shrinkwrap.exists() {
            return Ok(shrinkwrap);
        }

        let package_lock = root.join(PACKAGE_LOCK_FILE);
        if package_lock.exists() {
            return Ok(package_lock);
        }

        Err(LockfileError::NotFound(shrinkwrap))
    }

    /// Look up a resolved dependency by package name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LockedDependency> {
        self.dependencies.get(name)
    }
}
