//! package.json reading for installed trees
//!
//! Handles:
//! - name and version
//! - dependencies
//! - devDependencies
//! - optionalDependencies
//!
//! Entries whose value is not a string are ignored.

use crate::domain::{DependencyKind, DependencySpec};
use crate::error::TreeError;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;

/// The parts of a package.json the scanner reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageJson {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// Declarations in `dependencies`, `devDependencies`, `optionalDependencies` order
    pub declared: Vec<DependencySpec>,
}

impl PackageJson {
    /// Read and parse a package.json file
    pub fn read(path: &Path) -> Result<Self, TreeError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TreeError::not_found(path.parent().unwrap_or(path)),
            _ => TreeError::read_error(path, e),
        })?;
        Self::parse(&content, path)
    }

    /// Parse package.json content; `path` is only used for error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, TreeError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| TreeError::json_parse_error(path, e.to_string()))?;

        let Some(object) = json.as_object() else {
            return Err(TreeError::json_parse_error(
                path,
                "expected a JSON object at the top level",
            ));
        };

        let mut declared = Vec::new();
        for kind in DependencyKind::ALL {
            if let Some(deps) = object.get(kind.manifest_key()).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, kind, &mut declared);
            }
        }

        Ok(Self {
            name: string_field(object, "name"),
            version: string_field(object, "version"),
            declared,
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn parse_dependency_object(
    deps: &Map<String, Value>,
    kind: DependencyKind,
    output: &mut Vec<DependencySpec>,
) {
    for (name, spec) in deps {
        if let Some(spec) = spec.as_str() {
            output.push(DependencySpec::new(name.clone(), spec, kind));
        }
    }
}
