//! Registry metadata for a single package
//!
//! Only the parts of an npm packument needed for version selection are
//! modelled; every other field in the registry document is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Full published metadata for one package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packument {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Dist-tag name to version
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    /// Published versions keyed by version string
    #[serde(default)]
    pub versions: HashMap<String, PackageManifest>,
}

/// Manifest of one published version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Version string
    #[serde(default)]
    pub version: String,
    /// Project homepage
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub homepage: Option<String>,
}

/// Accepts any JSON value, keeping it only when it is a string
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}

impl Packument {
    /// Creates an empty packument
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a published version
    pub fn with_version(mut self, version: &str) -> Self {
        self.versions
            .insert(version.to_string(), PackageManifest::new(version));
        self
    }

    /// Adds a published version with its manifest
    pub fn with_manifest(mut self, manifest: PackageManifest) -> Self {
        self.versions.insert(manifest.version.clone(), manifest);
        self
    }

    /// Points a dist-tag at a version
    pub fn with_tag(mut self, tag: &str, version: &str) -> Self {
        self.dist_tags.insert(tag.to_string(), version.to_string());
        self
    }

    /// Manifest for the version a dist-tag points at
    pub fn tagged(&self, tag: &str) -> Option<&PackageManifest> {
        self.dist_tags
            .get(tag)
            .and_then(|version| self.versions.get(version))
    }

    /// Use the `versions` key for any manifest that lacks its own version
    pub fn fill_missing_versions(mut self) -> Self {
        for (key, manifest) in self.versions.iter_mut() {
            if manifest.version.is_empty() {
                manifest.version = key.clone();
            }
        }
        self
    }
}

impl PackageManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            homepage: None,
        }
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }
}
