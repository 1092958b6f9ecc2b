//! Declared and installed dependency records

use super::Specifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The package.json section a dependency is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// `dependencies`
    #[serde(rename = "dependencies")]
    Prod,
    /// `devDependencies`
    #[serde(rename = "devDependencies")]
    Dev,
    /// `optionalDependencies`
    #[serde(rename = "optionalDependencies")]
    Optional,
}

impl DependencyKind {
    /// All kinds, in the order declarations are merged
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Prod,
        DependencyKind::Dev,
        DependencyKind::Optional,
    ];

    /// The package.json key for this kind
    pub fn manifest_key(&self) -> &'static str {
        match self {
            DependencyKind::Prod => "dependencies",
            DependencyKind::Dev => "devDependencies",
            DependencyKind::Optional => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

/// A dependency declared by the root package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Package name
    pub name: String,
    /// Raw version specifier as written in package.json
    pub spec: String,
    /// Section the dependency was declared in
    pub kind: DependencyKind,
}

impl DependencySpec {
    /// Creates a new declared dependency
    pub fn new(name: impl Into<String>, spec: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
            kind,
        }
    }

    /// Creates a `dependencies` entry
    pub fn prod(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, spec, DependencyKind::Prod)
    }

    /// Creates a `devDependencies` entry
    pub fn dev(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, spec, DependencyKind::Dev)
    }

    /// Creates an `optionalDependencies` entry
    pub fn optional(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, spec, DependencyKind::Optional)
    }

    /// Classify the raw specifier
    pub fn specifier(&self) -> Specifier {
        Specifier::parse(&self.spec)
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.spec)
    }
}

/// A dependency that is present on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledRecord {
    /// Version from the installed package.json
    pub version: String,
    /// Directory the package is installed in
    pub path: PathBuf,
}

impl InstalledRecord {
    pub fn new(version: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            path: path.into(),
        }
    }
}
