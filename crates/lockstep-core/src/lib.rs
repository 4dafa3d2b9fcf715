//! Consistency checking between npm manifests and lockfiles.
//!
//! This crate provides:
//! - Parsing of `package.json` manifests and `npm-shrinkwrap.json` /
//!   `package-lock.json` lockfiles
//! - Validation that every declared dependency exists in the lock and that
//!   each locked version satisfies its declared range
//! - Lockfile regeneration by driving the package manager

mod lockfile;
mod manifest;
mod regenerate;
mod validate;

pub use lockfile::{
    LockedDependency, Lockfile, LockfileError, PACKAGE_LOCK_FILE, SHRINKWRAP_FILE,
};
pub use manifest::{Manifest, ManifestError, MANIFEST_FILE};
pub use regenerate::{regenerate, RegenerateError, RegenerateOptions, NODE_MODULES_DIR};
pub use validate::{satisfies, validate, DependencySection, Violation};
