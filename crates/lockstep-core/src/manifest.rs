//! npm package manifest (`package.json`) parsing.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The manifest filename.
pub const MANIFEST_FILE: &str = "package.json";

/// Errors that can occur when loading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The parts of a `package.json` document consulted by validation.
///
/// npm manifests carry many other fields (`scripts`, `engines`, and so on);
/// those are ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Package name.
    #[serde(default)]
    pub name: Option<String>,

    /// Package version.
    #[serde(default)]
    pub version: Option<String>,

    /// Runtime dependencies: package name to declared version range.
    ///
    /// Declared key order is preserved; validation output follows it.
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development-only dependencies.
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,
}

impl Manifest {
    /// Load a manifest from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not valid
    /// JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed. Dependency ranges are kept
    /// as raw strings here; an unparseable range is a validation finding,
    /// not a parse failure.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal_manifest() {
        let manifest = Manifest::parse("{}").unwrap();
        assert!(manifest.name.is_none());
        assert!(manifest.dependencies.is_empty());
        assert!(manifest.dev_dependencies.is_empty());
    }

    #[test]
    fn parse_full_manifest() {
        let json = r#"{
            "name": "my-app",
            "version": "1.2.3",
            "dependencies": {
                "left-pad": "^1.3.0",
                "lodash": "~4.17.0"
            },
            "devDependencies": {
                "mocha": ">=10.0.0 <11.0.0"
            }
        }"#;
        let manifest = Manifest::parse(json).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("my-app"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dev_dependencies.len(), 1);
        assert_eq!(
            manifest.dependencies.get("left-pad").map(String::as_str),
            Some("^1.3.0")
        );
    }

    #[test]
    fn declared_key_order_is_preserved() {
        let json = r#"{
            "dependencies": {
                "zebra": "^1.0.0",
                "alpha": "^2.0.0",
                "mango": "^3.0.0"
            }
        }"#;
        let manifest = Manifest::parse(json).unwrap();
        let names: Vec<&String> = manifest.dependencies.keys().collect();
        assert_eq!(names, ["zebra", "alpha", "mango"]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{
            "name": "my-app",
            "scripts": { "build": "tsc" },
            "engines": { "node": ">=18" },
            "dependencies": { "express": "^4.18.0" }
        }"#;
        let manifest = Manifest::parse(json).unwrap();
        assert_eq!(manifest.dependencies.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Manifest::parse("{ not json").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(..)));
    }

    #[test]
    fn from_path_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = Manifest::from_path(tmp.path().join(MANIFEST_FILE)).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(..)));
    }

    #[test]
    fn from_path_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(MANIFEST_FILE);
        fs::write(&path, r#"{ "dependencies": { "chalk": "^5.0.0" } }"#).unwrap();

        let manifest = Manifest::from_path(&path).unwrap();
        assert_eq!(manifest.dependencies.len(), 1);
    }
}
