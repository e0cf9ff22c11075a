//! PDF layout engine seam.
//!
//! The extraction rules never touch PDF internals. They consume pages through
//! [`ParsedPage`], which exposes the page text and whatever tables the engine
//! was able to find. [`LopdfEngine`] is the default engine; tests and callers
//! with their own parser plug in through [`LayoutEngine`].

pub(crate) mod extractor;
mod glyphs;
mod layout;

pub use extractor::{LopdfEngine, LopdfPage};
pub use layout::{split_cells, tables_from_text};

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A single table cell; `None` when the engine found an empty slot.
pub type Cell = Option<String>;

/// An ordered row of cells. Rows are not required to be rectangular.
pub type Row = Vec<Cell>;

/// A table as supplied by the layout engine: ordered rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Create a table from already split rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a table from string literals, mapping `""` to an absent cell.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        (!cell.is_empty()).then(|| cell.to_string())
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One page of a parsed document.
pub trait ParsedPage {
    /// Page text, or `None` when the page carries no text layer.
    fn extract_text(&self) -> Option<String>;

    /// Tables found on the page, in reading order.
    fn extract_tables(&self) -> Vec<Table>;
}

/// A PDF layout engine that turns a file into parsed pages.
pub trait LayoutEngine {
    /// Page handle produced by this engine.
    type Page: ParsedPage;

    /// Open and parse the document at `path`, returning its pages in order.
    ///
    /// The underlying file is only held for the duration of this call.
    fn open(&self, path: &Path) -> Result<Vec<Self::Page>>;
}
