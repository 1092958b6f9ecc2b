//! JSON output for machine processing
//!
//! Writes one object keyed by package name, in result order.

use crate::domain::{DependencyKind, OutdatedEntry, ScanResult};
use crate::output::{relative_path, ResultPresenter};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::io::Write;
use std::path::PathBuf;

/// JSON presenter for machine-readable output
pub struct JsonPresenter {
    /// Add type and homepage fields
    long: bool,
    /// Base directory for install paths, `None` for absolute paths
    relative_to: Option<PathBuf>,
}

impl JsonPresenter {
    /// Create a new JSON presenter
    pub fn new(long: bool, relative_to: Option<PathBuf>) -> Self {
        Self { long, relative_to }
    }

    fn location(&self, entry: &OutdatedEntry) -> Option<String> {
        let path = entry.path.as_ref()?;
        let path = match &self.relative_to {
            Some(base) => relative_path(path, base),
            None => path.clone(),
        };
        Some(path.display().to_string())
    }

    fn json_entry<'a>(&self, entry: &'a OutdatedEntry) -> JsonEntry<'a> {
        JsonEntry {
            current: entry.current.as_deref(),
            wanted: &entry.wanted,
            latest: &entry.latest,
            location: self.location(entry),
            kind: self.long.then_some(entry.kind),
            homepage: if self.long {
                entry.homepage.as_deref()
            } else {
                None
            },
        }
    }
}

/// JSON representation of one outdated package
#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<&'a str>,
    wanted: &'a str,
    latest: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<DependencyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<&'a str>,
}

/// Map that keeps insertion order when serialized
struct JsonOutput<'a>(Vec<(&'a str, JsonEntry<'a>)>);

impl Serialize for JsonOutput<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entry) in &self.0 {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl ResultPresenter for JsonPresenter {
    fn present(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput(
            result
                .iter()
                .map(|entry| (entry.name.as_str(), self.json_entry(entry)))
                .collect(),
        );

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        Ok(())
    }
}
