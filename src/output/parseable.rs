//! Parseable output for scripts
//!
//! One line per package:
//! `path:name@wanted:name@current:name@latest`, with `MISSING` in place of
//! `name@current` for packages that are not installed. Long output appends
//! `:type:homepage`.

use crate::domain::{OutdatedEntry, ScanResult};
use crate::output::{ResultPresenter, MISSING};
use std::io::Write;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Parseable presenter
pub struct ParseablePresenter {
    /// Append type and homepage fields
    long: bool,
}

impl ParseablePresenter {
    /// Create a new parseable presenter
    pub fn new(long: bool) -> Self {
        Self { long }
    }

    fn line(&self, entry: &OutdatedEntry) -> String {
        let name = &entry.name;
        let path = entry
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let current = match &entry.current {
            Some(current) => format!("{}@{}", name, current),
            None => MISSING.to_string(),
        };

        let mut fields = vec![
            path,
            format!("{}@{}", name, entry.wanted),
            current,
            format!("{}@{}", name, entry.latest),
        ];
        if self.long {
            fields.push(entry.kind.to_string());
            fields.push(entry.homepage.clone().unwrap_or_default());
        }
        fields.join(":")
    }
}

impl ResultPresenter for ParseablePresenter {
    fn present(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        for entry in result {
            write!(writer, "{}{}", self.line(entry), LINE_ENDING)?;
        }
        Ok(())
    }
}
