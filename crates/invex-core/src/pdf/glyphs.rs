//! Page text rebuilt from positioned glyphs.
//!
//! pdf-extract's plain text output collapses every horizontal gap into a
//! single space, which erases table columns. This output device keeps the
//! glyph positions in view and writes a tab wherever the gap to the previous
//! glyph is wider than [`COLUMN_GAP_EMS`] font sizes.

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use crate::error::PdfError;

/// Horizontal gap, in multiples of the font size, that separates two cells.
pub const COLUMN_GAP_EMS: f64 = 1.0;

/// Gap that still reads as a word break rather than adjacent glyphs.
const WORD_GAP_EMS: f64 = 0.1;

/// Vertical movement that starts a new line.
const LINE_SHIFT_EMS: f64 = 0.5;

/// Collects one page of text, marking column gaps with `\t`.
#[derive(Debug, Default)]
pub struct ColumnTextOutput {
    text: String,
    last_end: f64,
    last_y: f64,
    started: bool,
}

impl ColumnTextOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text collected so far.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Record a glyph starting at `(x, y)` and ending at `end`.
    fn push_glyph(&mut self, x: f64, y: f64, end: f64, font_size: f64, glyph: &str) {
        if self.started {
            if (y - self.last_y).abs() > font_size * LINE_SHIFT_EMS {
                self.text.push('\n');
            } else {
                let gap = x - self.last_end;
                if gap > font_size * COLUMN_GAP_EMS {
                    self.text.push('\t');
                } else if gap > font_size * WORD_GAP_EMS && !self.text.ends_with(' ') {
                    self.text.push(' ');
                }
            }
        }

        self.text.push_str(glyph);
        self.started = true;
        self.last_y = y;
        self.last_end = end;
    }
}

impl OutputDev for ColumnTextOutput {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.started = false;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        // Side of the square with the same area as the transformed glyph box.
        let scale = (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let size = font_size * scale;
        let (x, y) = (trm.m31, trm.m32);

        self.push_glyph(x, y, x + width * size, size, char);
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Text of each listed page, in the order given.
pub fn column_text(doc: &Document, page_numbers: &[u32]) -> Result<Vec<String>, PdfError> {
    page_numbers
        .iter()
        .map(|&number| {
            let mut output = ColumnTextOutput::new();
            pdf_extract::output_doc_page(doc, &mut output, number)
                .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", number, e)))?;
            Ok(output.into_text())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_word(out: &mut ColumnTextOutput, word: &str, x: f64, y: f64) {
        // 12pt glyphs, each half an em wide
        let mut pos = x;
        for c in word.chars() {
            out.push_glyph(pos, y, pos + 6.0, 12.0, &c.to_string());
            pos += 6.0;
        }
    }

    #[test]
    fn test_wide_gap_becomes_tab() {
        let mut out = ColumnTextOutput::new();
        write_word(&mut out, "Item", 50.0, 700.0);
        write_word(&mut out, "Qty", 200.0, 700.0);
        write_word(&mut out, "Amount", 350.0, 700.0);

        assert_eq!(out.into_text(), "Item\tQty\tAmount");
    }

    #[test]
    fn test_narrow_gap_is_a_space() {
        let mut out = ColumnTextOutput::new();
        write_word(&mut out, "Unit", 50.0, 700.0);
        write_word(&mut out, "Price", 77.0, 700.0);

        assert_eq!(out.into_text(), "Unit Price");
    }

    #[test]
    fn test_vertical_move_starts_new_line() {
        let mut out = ColumnTextOutput::new();
        write_word(&mut out, "Acme", 50.0, 700.0);
        write_word(&mut out, "Widget", 50.0, 680.0);
        write_word(&mut out, "2", 200.0, 680.0);

        assert_eq!(out.into_text(), "Acme\nWidget\t2");
    }

    #[test]
    fn test_explicit_space_glyph_is_not_doubled() {
        let mut out = ColumnTextOutput::new();
        write_word(&mut out, "Acme ", 50.0, 700.0);
        write_word(&mut out, "Corp", 82.0, 700.0);

        assert_eq!(out.into_text(), "Acme Corp");
    }
}
