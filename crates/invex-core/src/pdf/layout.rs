//! Text-layout table detection.
//!
//! Text extracted from a PDF keeps column gaps as tabs, pipes, or runs of
//! spaces. A line that splits into enough cells is treated as a table row and
//! consecutive rows are grouped into one table. Nothing here looks at glyph
//! coordinates.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::{Row, Table};

lazy_static! {
    /// Column gap: a tab, a pipe, or two or more spaces.
    static ref CELL_GAP: Regex = Regex::new(r"\t+|\s*\|\s*| {2,}").unwrap();
}

/// Split a text line into cells on column gaps.
///
/// Leading and trailing gaps are ignored; empty cells inside the line (for
/// example `a || b`) are kept as `None`.
pub fn split_cells(line: &str) -> Row {
    let trimmed = line.trim_matches(|c: char| c.is_whitespace() || c == '|');
    if trimmed.is_empty() {
        return Vec::new();
    }

    CELL_GAP
        .split(trimmed)
        .map(|cell| {
            let cell = cell.trim();
            (!cell.is_empty()).then(|| cell.to_string())
        })
        .collect()
}

/// Group consecutive multi-cell lines of `text` into tables.
pub fn tables_from_text(text: &str, min_cells_per_row: usize) -> Vec<Table> {
    let min_cells = min_cells_per_row.max(2);
    let mut tables = Vec::new();
    let mut current: Vec<Row> = Vec::new();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() >= min_cells {
            trace!("Table row: {:?}", cells);
            current.push(cells);
        } else if !current.is_empty() {
            tables.push(Table::new(std::mem::take(&mut current)));
        }
    }

    if !current.is_empty() {
        tables.push(Table::new(current));
    }

    tables
}
