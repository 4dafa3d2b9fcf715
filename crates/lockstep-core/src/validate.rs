//! Manifest/lockfile consistency validation.
//!
//! Detects the case where `package.json` was edited without the lockfile
//! being regenerated: every declared dependency must exist in the lock, and
//! the version pinned there must satisfy the declared range.

use crate::{Lockfile, Manifest};
use indexmap::IndexMap;
use nodejs_semver::{Range, Version};
use serde::Serialize;
use std::fmt;

/// Which manifest section a dependency was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DependencySection {
    /// Runtime dependencies (`dependencies`).
    #[serde(rename = "dependencies")]
    Runtime,

    /// Development-only dependencies (`devDependencies`).
    #[serde(rename = "devDependencies")]
    Development,
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime => write!(f, "dependencies"),
            Self::Development => write!(f, "devDependencies"),
        }
    }
}

/// One detected inconsistency between manifest and lockfile.
///
/// Violations are values, not errors: validation always checks every
/// declared dependency and reports everything it finds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Violation {
    /// A declared package has no entry in the lockfile.
    MissingFromLock {
        /// Package name as declared.
        package: String,
        /// Section the declaration came from.
        section: DependencySection,
    },

    /// The locked version does not satisfy the declared range.
    ///
    /// Also reported when the pinned version string is not a parseable
    /// version, since such a pin can satisfy no range.
    VersionMismatch {
        /// Package name as declared.
        package: String,
        /// Section the declaration came from.
        section: DependencySection,
        /// The range declared in the manifest.
        range: String,
        /// The exact version pinned in the lockfile.
        locked: String,
    },

    /// The declared range is not parseable under the npm range grammar.
    InvalidRange {
        /// Package name as declared.
        package: String,
        /// Section the declaration came from.
        section: DependencySection,
        /// The offending range string.
        range: String,
        /// Parser diagnostic.
        reason: String,
    },
}

impl Violation {
    /// The package name this violation concerns.
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::MissingFromLock { package, .. }
            | Self::VersionMismatch { package, .. }
            | Self::InvalidRange { package, .. } => package,
        }
    }

    /// The manifest section the declaration came from.
    #[must_use]
    pub fn section(&self) -> DependencySection {
        match self {
            Self::MissingFromLock { section, .. }
            | Self::VersionMismatch { section, .. }
            | Self::InvalidRange { section, .. } => *section,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFromLock { package, section } => {
                write!(f, "{package}: declared in {section} but missing from the lockfile")
            }
            Self::VersionMismatch {
                package,
                section,
                range,
                locked,
            } => {
                write!(
                    f,
                    "{package}: locked version {locked} does not satisfy '{range}' ({section})"
                )
            }
            Self::InvalidRange {
                package,
                section,
                range,
                reason,
            } => {
                write!(f, "{package}: invalid version range '{range}' ({section}): {reason}")
            }
        }
    }
}

/// Cross-check every declared dependency against the lockfile.
///
/// The runtime section is checked first, then the development section, each
/// in its declared key order and against the same lock mapping. A package
/// declared in both sections is checked twice independently. The result is
/// deterministic: unchanged inputs yield an identical sequence.
///
/// This is a pure report. Neither document is mutated, and problems are
/// returned as [`Violation`] values rather than errors, so every declared
/// dependency is checked even after earlier ones fail.
#[must_use]
pub fn validate(manifest: &Manifest, lockfile: &Lockfile) -> Vec<Violation> {
    let mut violations = Vec::new();

    validate_section(
        DependencySection::Runtime,
        &manifest.dependencies,
        lockfile,
        &mut violations,
    );
    validate_section(
        DependencySection::Development,
        &manifest.dev_dependencies,
        lockfile,
        &mut violations,
    );

    violations
}

/// Check one manifest section against the lock mapping.
fn validate_section(
    section: DependencySection,
    declared: &IndexMap<String, String>,
    lockfile: &Lockfile,
    violations: &mut Vec<Violation>,
) {
    for (package, range) in declared {
        let locked = match lockfile.get(package) {
            Some(locked) => locked,
            None => {
                violations.push(Violation::MissingFromLock {
                    package: package.clone(),
                    section,
                });
                continue;
            }
        };

        let parsed = match parse_range(range) {
            Ok(parsed) => parsed,
            Err(reason) => {
                violations.push(Violation::InvalidRange {
                    package: package.clone(),
                    section,
                    range: range.clone(),
                    reason,
                });
                continue;
            }
        };

        // An unparseable pin satisfies no range.
        let satisfied = locked
            .version
            .parse::<Version>()
            .is_ok_and(|version| parsed.satisfies(&version));

        if !satisfied {
            violations.push(Violation::VersionMismatch {
                package: package.clone(),
                section,
                range: range.clone(),
                locked: locked.version.clone(),
            });
        }
    }
}

/// Check whether an exact version satisfies a declared range.
///
/// This is the boolean seam over the range primitive: unparseable ranges
/// and unparseable versions both answer `false`. Validation proper keeps
/// the two cases apart; see [`validate`].
#[must_use]
pub fn satisfies(version: &str, range: &str) -> bool {
    match (parse_range(range), version.parse::<Version>()) {
        (Ok(range), Ok(version)) => range.satisfies(&version),
        _ => false,
    }
}

/// Parse a declared range under the npm grammar.
///
/// An empty or blank range is normalized to `*`, matching npm's reading of
/// an empty requirement as "any version".
fn parse_range(range: &str) -> Result<Range, String> {
    let trimmed = range.trim();
    let normalized = if trimmed.is_empty() { "*" } else { trimmed };

    normalized.parse::<Range>().map_err(|e| e.to_string())
}
