//! Output presentation for scan results
//!
//! This module provides:
//! - Aligned table output for human-readable display
//! - JSON output for machine processing
//! - Colon separated parseable lines for scripts

mod json;
mod parseable;
mod table;

pub use json::JsonPresenter;
pub use parseable::ParseablePresenter;
pub use table::TablePresenter;

use crate::domain::{OutdatedEntry, ScanResult};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Shown in the Current column for a dependency that is not installed
pub const MISSING: &str = "MISSING";

/// Shown in the Location column when there is no root package
pub const GLOBAL: &str = "global";

/// Output mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Aligned, optionally colored table
    #[default]
    Table,
    /// JSON object keyed by package name
    Json,
    /// One colon separated line per package
    Parseable,
}

/// Configuration for output presentation
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Output mode (table, json, parseable)
    pub mode: OutputMode,
    /// Whether to use colors (table mode only)
    pub color: bool,
    /// Add dependency type and homepage
    pub long: bool,
    /// Report install paths relative to this directory (project scope)
    pub relative_to: Option<PathBuf>,
}

/// Trait for result presenters
pub trait ResultPresenter {
    /// Write the scan result
    fn present(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create a presenter based on configuration
pub fn create_presenter(config: &OutputConfig) -> Box<dyn ResultPresenter> {
    match config.mode {
        OutputMode::Table => Box::new(TablePresenter::new(config.color, config.long)),
        OutputMode::Json => Box::new(JsonPresenter::new(config.long, config.relative_to.clone())),
        OutputMode::Parseable => Box::new(ParseablePresenter::new(config.long)),
    }
}

/// Display columns for one outdated entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub name: String,
    /// Installed version or `MISSING`
    pub current: String,
    pub wanted: String,
    pub latest: String,
    /// Root package name or `global`
    pub location: String,
    /// Dependency section name
    pub kind: String,
    /// Homepage or empty
    pub homepage: String,
}

impl DisplayRow {
    pub fn from_entry(entry: &OutdatedEntry) -> Self {
        Self {
            name: entry.name.clone(),
            current: entry.current.as_deref().unwrap_or(MISSING).to_string(),
            wanted: entry.wanted.clone(),
            latest: entry.latest.clone(),
            location: entry.location.as_deref().unwrap_or(GLOBAL).to_string(),
            kind: entry.kind.to_string(),
            homepage: entry.homepage.clone().unwrap_or_default(),
        }
    }
}

/// Express `path` relative to `base`, walking up with `..` where needed.
///
/// Relative paths and paths on a different root are returned unchanged.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_relative() {
        return path.to_path_buf();
    }

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return path.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}
