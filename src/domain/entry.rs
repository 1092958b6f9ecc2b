//! Outdated entries and the sorted scan result

use super::{locale_cmp, DependencyKind, DependencySpec, InstalledRecord, PackageManifest};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One dependency that is missing or behind its wanted/latest version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedEntry {
    /// Package name
    pub name: String,
    /// Installed version, `None` when the dependency is not installed
    pub current: Option<String>,
    /// Highest version satisfying the declared specifier
    pub wanted: String,
    /// Version the `latest` dist-tag points at
    pub latest: String,
    /// Install directory, `None` when not installed
    pub path: Option<PathBuf>,
    /// Name of the root package, `None` for a global scan
    pub location: Option<String>,
    /// Section the dependency was declared in
    pub kind: DependencyKind,
    /// Homepage of the wanted version
    pub homepage: Option<String>,
}

impl OutdatedEntry {
    /// Returns true if a dependency with these versions must be reported
    pub fn is_outdated(current: Option<&str>, wanted: &str, latest: &str) -> bool {
        match current {
            None => true,
            Some(current) => current != wanted || wanted != latest,
        }
    }

    /// Build an entry for a checked dependency, or `None` if it is up to date
    pub fn evaluate(
        dependency: &DependencySpec,
        installed: Option<&InstalledRecord>,
        wanted: &PackageManifest,
        latest: &PackageManifest,
        location: Option<&str>,
    ) -> Option<Self> {
        let current = installed.map(|record| record.version.as_str());
        if !Self::is_outdated(current, &wanted.version, &latest.version) {
            return None;
        }

        Some(Self {
            name: dependency.name.clone(),
            current: current.map(str::to_string),
            wanted: wanted.version.clone(),
            latest: latest.version.clone(),
            path: installed.map(|record| record.path.clone()),
            location: location.map(str::to_string),
            kind: dependency.kind,
            homepage: wanted.homepage.clone(),
        })
    }

    /// Returns true if the dependency is not installed
    pub fn is_missing(&self) -> bool {
        self.current.is_none()
    }

    /// Returns true if the installed version already satisfies the declared range
    pub fn is_wanted(&self) -> bool {
        self.current.as_deref() == Some(self.wanted.as_str())
    }
}

/// Outdated entries sorted by package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    entries: Vec<OutdatedEntry>,
}

impl ScanResult {
    /// Sort entries by name; the input order does not matter
    pub fn from_unsorted(mut entries: Vec<OutdatedEntry>) -> Self {
        entries.sort_by(|a, b| locale_cmp(&a.name, &b.name));
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutdatedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by package name
    pub fn get(&self, name: &str) -> Option<&OutdatedEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a OutdatedEntry;
    type IntoIter = std::slice::Iter<'a, OutdatedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
