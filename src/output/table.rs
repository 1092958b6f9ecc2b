//! Table output for human-readable display
//!
//! Columns are sized on their visible width, so colored cells line up with
//! plain ones. Package is left aligned, the three version columns are right
//! aligned and the remaining columns are left aligned.

use crate::domain::{OutdatedEntry, ScanResult};
use crate::output::{DisplayRow, ResultPresenter};
use colored::Colorize;
use regex::Regex;
use std::io::Write;
use std::sync::LazyLock;

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

const HEADINGS: [&str; 5] = ["Package", "Current", "Wanted", "Latest", "Location"];
const LONG_HEADINGS: [&str; 2] = ["Package Type", "Homepage"];
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

fn align(column: usize) -> Align {
    match column {
        1..=3 => Align::Right,
        _ => Align::Left,
    }
}

/// Table presenter
pub struct TablePresenter {
    /// Whether to use colors
    color: bool,
    /// Add Package Type and Homepage columns
    long: bool,
}

impl TablePresenter {
    /// Create a new table presenter
    pub fn new(color: bool, long: bool) -> Self {
        Self { color, long }
    }

    fn header(&self) -> Vec<String> {
        let count = if self.long { 2 } else { 0 };
        HEADINGS
            .iter()
            .chain(LONG_HEADINGS.iter().take(count))
            .map(|heading| {
                if self.color {
                    heading.underline().to_string()
                } else {
                    heading.to_string()
                }
            })
            .collect()
    }

    fn row(&self, entry: &OutdatedEntry) -> Vec<String> {
        let row = DisplayRow::from_entry(entry);
        let (name, wanted, latest) = if self.color {
            let name = if entry.is_wanted() {
                row.name.yellow()
            } else {
                row.name.red()
            };
            (
                name.to_string(),
                row.wanted.green().to_string(),
                row.latest.magenta().to_string(),
            )
        } else {
            (row.name, row.wanted, row.latest)
        };

        let mut cells = vec![name, row.current, wanted, latest, row.location];
        if self.long {
            cells.push(row.kind);
            cells.push(row.homepage);
        }
        cells
    }
}

impl ResultPresenter for TablePresenter {
    fn present(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if result.is_empty() {
            return Ok(());
        }

        let mut rows = vec![self.header()];
        rows.extend(result.iter().map(|entry| self.row(entry)));

        for line in render(&rows) {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

fn visible_width(cell: &str) -> usize {
    ANSI_RE.replace_all(cell, "").chars().count()
}

fn render(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| visible_width(cell))
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    let padding = " ".repeat(widths[column] - visible_width(cell));
                    match align(column) {
                        Align::Left => format!("{}{}", cell, padding),
                        Align::Right => format!("{}{}", padding, cell),
                    }
                })
                .collect();
            cells.join(COLUMN_GAP).trim_end().to_string()
        })
        .collect()
}
