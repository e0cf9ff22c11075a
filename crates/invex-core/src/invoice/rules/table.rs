//! Line item extraction from layout-engine tables.
//!
//! A table contributes items only when it has a recognisable header row.
//! Tables without one are skipped rather than guessed at.

use tracing::{debug, trace};

use super::keywords::{
    contains_any, DESCRIPTION_KEYWORDS, FOOTER_KEYWORDS, HEADER_KEYWORDS, QUANTITY_KEYWORDS,
    TOTAL_PRICE_KEYWORDS, UNIT_PRICE_KEYWORDS,
};
use crate::models::invoice::LineItem;
use crate::pdf::{Cell, Row, Table};

/// Assignment of line item fields to column indices for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub description: Option<usize>,
    pub quantity: Option<usize>,
    pub unit_price: Option<usize>,
    pub total_price: Option<usize>,
}

impl ColumnMap {
    /// Classify each header label into at most one field.
    ///
    /// Labels are checked against description, quantity, unit price, then
    /// total keywords. When several columns fit a field the rightmost wins.
    pub fn from_header(header: &[Cell]) -> Self {
        let mut map = Self::default();

        for (idx, cell) in header.iter().enumerate() {
            let label = cell.as_deref().unwrap_or("").trim().to_lowercase();

            if contains_any(&label, DESCRIPTION_KEYWORDS) {
                map.description = Some(idx);
            } else if contains_any(&label, QUANTITY_KEYWORDS) {
                map.quantity = Some(idx);
            } else if contains_any(&label, UNIT_PRICE_KEYWORDS) {
                map.unit_price = Some(idx);
            } else if contains_any(&label, TOTAL_PRICE_KEYWORDS) {
                map.total_price = Some(idx);
            }
        }

        map
    }

    /// Whether no column was mapped at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy the mapped cells of `row` into a line item.
    ///
    /// Columns past the end of a short row are left unset.
    pub fn build_item(&self, row: &[Cell]) -> LineItem {
        let take = |idx: Option<usize>| idx.and_then(|i| row.get(i)).cloned().flatten();

        LineItem {
            description: take(self.description),
            quantity: take(self.quantity),
            unit_price: take(self.unit_price),
            total_price: take(self.total_price),
        }
    }
}

/// Lower-cased, space-joined text of the non-empty cells of a row.
fn joined_lower(row: &[Cell]) -> String {
    row.iter()
        .filter_map(|cell| cell.as_deref())
        .filter(|cell| !cell.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_blank(row: &[Cell]) -> bool {
    row.iter()
        .all(|cell| cell.as_deref().is_none_or(str::is_empty))
}

/// Index of the first row that looks like a column header.
pub fn find_header_row(table: &Table) -> Option<usize> {
    table
        .rows()
        .iter()
        .position(|row| contains_any(&joined_lower(row), HEADER_KEYWORDS))
}

/// Whether a data row is a subtotal, tax, or total line.
pub fn is_footer_row(row: &[Cell]) -> bool {
    contains_any(&joined_lower(row), FOOTER_KEYWORDS)
}

/// Extract line items from a single table.
pub fn extract_items(table: &Table) -> Vec<LineItem> {
    if table.len() < 2 {
        trace!("Skipping table with {} rows", table.len());
        return Vec::new();
    }

    let Some(header_idx) = find_header_row(table) else {
        debug!("No header row in {}-row table, skipping", table.len());
        return Vec::new();
    };

    let header: &Row = &table.rows()[header_idx];
    let columns = ColumnMap::from_header(header);
    debug!("Header at row {}: {:?}", header_idx, columns);

    let mut items = Vec::new();
    for row in &table.rows()[header_idx + 1..] {
        if is_blank(row) {
            continue;
        }
        if is_footer_row(row) {
            trace!("Skipping footer row: {:?}", row);
            continue;
        }

        let item = columns.build_item(row);
        if item.has_content() {
            items.push(item);
        }
    }

    items
}

/// Extract line items from every table on a page, in table then row order.
pub fn extract_page_items(tables: &[Table]) -> Vec<LineItem> {
    tables.iter().flat_map(extract_items).collect()
}
