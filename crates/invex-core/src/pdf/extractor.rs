//! PDF text and table extraction using lopdf and pdf-extract.
//!
//! pdf-extract interprets the content streams and [`column_text`] keeps the
//! column gaps it sees. lopdf handles loading, decryption and the fallback
//! text path.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::glyphs::column_text;
use super::layout::tables_from_text;
use super::{LayoutEngine, ParsedPage, Result, Table};
use crate::error::{panic_message, PdfError};
use crate::models::config::PdfConfig;

/// Layout engine backed by lopdf (structure) and pdf-extract (text layout).
#[derive(Debug, Clone, Default)]
pub struct LopdfEngine {
    config: PdfConfig,
}

/// A page parsed by [`LopdfEngine`].
#[derive(Debug, Clone)]
pub struct LopdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    text: String,
    min_cells_per_row: usize,
}

impl LopdfEngine {
    /// Create an engine with default PDF settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given PDF settings.
    pub fn with_config(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Parse an in-memory PDF into pages.
    pub fn load_pages(&self, data: &[u8]) -> Result<Vec<LopdfPage>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(PdfError::NoPages);
        }
        page_numbers.sort_unstable();
        if self.config.max_pages > 0 && page_numbers.len() > self.config.max_pages {
            debug!(
                "Limiting PDF from {} to {} pages",
                page_numbers.len(),
                self.config.max_pages
            );
            page_numbers.truncate(self.config.max_pages);
        }

        let texts = read_page_texts(&doc, &page_numbers, column_text);

        let pages: Vec<LopdfPage> = page_numbers
            .iter()
            .zip(texts)
            .map(|(&number, text)| LopdfPage {
                number,
                text,
                min_cells_per_row: self.config.min_cells_per_row,
            })
            .collect();

        debug!("Loaded PDF with {} pages", pages.len());
        Ok(pages)
    }
}

/// Read page text with `layout`, falling back to lopdf's own text
/// extraction when it fails or panics.
///
/// The lopdf fallback loses column gaps, so such pages yield text but no
/// tables.
fn read_page_texts<F>(doc: &Document, page_numbers: &[u32], layout: F) -> Vec<String>
where
    F: FnOnce(&Document, &[u32]) -> Result<Vec<String>>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| layout(doc, page_numbers)))
        .unwrap_or_else(|payload| Err(PdfError::TextExtraction(panic_message(&*payload))));

    match outcome {
        Ok(texts) => texts,
        Err(e) => {
            warn!("Layout text extraction failed ({}), falling back to lopdf", e);
            page_numbers
                .iter()
                .map(|&n| doc.extract_text(&[n]).unwrap_or_default())
                .collect()
        }
    }
}

impl LayoutEngine for LopdfEngine {
    type Page = LopdfPage;

    fn open(&self, path: &Path) -> Result<Vec<LopdfPage>> {
        // The file is read in full and closed before parsing begins.
        let data = std::fs::read(path)?;
        trace!("Read {} bytes from {}", data.len(), path.display());
        self.load_pages(&data)
    }
}

impl ParsedPage for LopdfPage {
    fn extract_text(&self) -> Option<String> {
        (!self.text.is_empty()).then(|| self.text.clone())
    }

    fn extract_tables(&self) -> Vec<Table> {
        tables_from_text(&self.text, self.min_cells_per_row)
    }
}

/// Build a one-page PDF with each entry of `lines` on its own text line.
///
/// Tabs inside a line place the following text in the next column, so
/// `"Item\tQty"` draws two cells well apart on the same baseline.
#[cfg(test)]
pub(crate) fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    sample_pdf_pages(&[lines])
}

/// Build a PDF with one page per entry of `pages`, laid out like [`sample_pdf`].
#[cfg(test)]
pub(crate) fn sample_pdf_pages(pages: &[&[&str]]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
        ];
        for (row, line) in lines.iter().enumerate() {
            let y = 780 - 20 * row as i64;
            for (col, cell) in line.split('\t').enumerate() {
                let x = 50 + 130 * col as i64;
                operations.push(Operation::new(
                    "Tm",
                    vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(cell)]));
            }
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Standard padding string from the PDF password algorithms.
    const PAD_BYTES: [u8; 32] = [
        0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
        0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
        0x69, 0x7A,
    ];

    fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut s: Vec<u8> = (0..=255).collect();
        let mut j = 0usize;
        for i in 0..256 {
            j = (j + s[i] as usize + key[i % key.len()] as usize) & 0xFF;
            s.swap(i, j);
        }

        let (mut i, mut j) = (0usize, 0usize);
        data.iter()
            .map(|&byte| {
                i = (i + 1) & 0xFF;
                j = (j + s[i] as usize) & 0xFF;
                s.swap(i, j);
                byte ^ s[(s[i] as usize + s[j] as usize) & 0xFF]
            })
            .collect()
    }

    /// One-page "Hello World" PDF under 40-bit RC4 with `user_password`.
    fn encrypted_pdf(user_password: &[u8]) -> Vec<u8> {
        use lopdf::{dictionary, Object, Stream, StringFormat};

        let file_id = b"invexfileid00001";
        let permissions: i32 = -4;

        let mut padded = user_password[..user_password.len().min(32)].to_vec();
        padded.extend_from_slice(&PAD_BYTES[..32 - padded.len()]);

        let owner_key = md5::compute(&padded);
        let o_value = rc4(&owner_key[..5], &padded);

        let mut key_input = padded.clone();
        key_input.extend_from_slice(&o_value);
        key_input.extend_from_slice(&(permissions as u32).to_le_bytes());
        key_input.extend_from_slice(file_id);
        let key = md5::compute(&key_input)[..5].to_vec();
        let u_value = rc4(&key, &PAD_BYTES);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F1 12 Tf 72 720 Td (Hello World) Tj ET".to_vec(),
        ));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        for (&(num, generation), object) in doc.objects.iter_mut() {
            let mut object_key = key.clone();
            object_key.extend_from_slice(&num.to_le_bytes()[..3]);
            object_key.extend_from_slice(&generation.to_le_bytes()[..2]);
            let digest = md5::compute(&object_key);
            let object_key = &digest[..key.len() + 5];

            match object {
                Object::Stream(stream) => {
                    let encrypted = rc4(object_key, &stream.content);
                    stream.set_content(encrypted);
                }
                Object::String(content, _) => *content = rc4(object_key, content),
                _ => {}
            }
        }

        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(o_value, StringFormat::Literal),
            "U" => Object::String(u_value, StringFormat::Literal),
            "P" => permissions as i64,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set(
            "ID",
            vec![
                Object::String(file_id.to_vec(), StringFormat::Literal),
                Object::String(file_id.to_vec(), StringFormat::Literal),
            ],
        );

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    #[test]
    fn test_load_generated_pdf() {
        let data = sample_pdf(&["Acme Corp", "Invoice Number: INV-2024-001"]);
        let pages = LopdfEngine::new().load_pages(&data).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        let text = pages[0].extract_text().unwrap();
        assert!(text.contains("INV-2024-001"), "{:?}", text);
    }

    #[test]
    fn test_columns_survive_as_table_cells() {
        let data = sample_pdf(&[
            "Acme Corp",
            "Item\tQty\tUnit Price\tAmount",
            "Widget\t2\t5.00\t10.00",
            "Thank you for your business",
        ]);
        let pages = LopdfEngine::new().load_pages(&data).unwrap();

        assert_eq!(
            pages[0].extract_tables(),
            vec![Table::from_strings([
                ["Item", "Qty", "Unit Price", "Amount"],
                ["Widget", "2", "5.00", "10.00"],
            ])]
        );
    }

    #[test]
    fn test_max_pages_limits_pages_read() {
        let data = sample_pdf_pages(&[&["Page one"], &["Page two"], &["Page three"]]);

        let all = LopdfEngine::new().load_pages(&data).unwrap();
        assert_eq!(all.len(), 3);

        let engine = LopdfEngine::with_config(PdfConfig {
            max_pages: 2,
            ..PdfConfig::default()
        });
        let pages = engine.load_pages(&data).unwrap();

        let numbers: Vec<u32> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(pages[1].extract_text().unwrap().contains("Page two"));
        assert!(pages
            .iter()
            .all(|p| !p.extract_text().unwrap_or_default().contains("three")));
    }

    #[test]
    fn test_empty_password_pdf_is_decrypted() {
        let pages = LopdfEngine::new().load_pages(&encrypted_pdf(b"")).unwrap();

        assert_eq!(pages.len(), 1);
        let text = pages[0].extract_text().unwrap();
        assert!(text.contains("Hello World"), "{:?}", text);
    }

    #[test]
    fn test_password_protected_pdf_is_rejected() {
        let err = LopdfEngine::new()
            .load_pages(&encrypted_pdf(b"secret123"))
            .unwrap_err();
        assert!(matches!(err, PdfError::Encrypted), "{:?}", err);
    }

    #[test]
    fn test_layout_failure_falls_back_to_lopdf() {
        let doc = Document::load_mem(&sample_pdf(&["Acme Corp"])).unwrap();

        let texts = read_page_texts(&doc, &[1], |_, _| {
            Err(PdfError::TextExtraction("unsupported font".to_string()))
        });
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Acme Corp"), "{:?}", texts);
    }

    #[test]
    fn test_layout_panic_falls_back_to_lopdf() {
        let doc = Document::load_mem(&sample_pdf(&["Acme Corp"])).unwrap();

        let texts = read_page_texts(&doc, &[1], |_, _| panic!("bad glyph table"));
        assert!(texts[0].contains("Acme Corp"), "{:?}", texts);
    }

    #[test]
    fn test_blank_page_has_no_text() {
        let data = sample_pdf(&[]);
        let pages = LopdfEngine::new().load_pages(&data).unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0]
            .extract_text()
            .is_none_or(|t| t.trim().is_empty()));
    }

    #[test]
    fn test_open_missing_file() {
        let engine = LopdfEngine::new();
        let err = engine
            .open(Path::new("/nonexistent/invoice.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfError::Open(_)));
    }

    #[test]
    fn test_load_garbage_fails_to_parse() {
        let engine = LopdfEngine::new();
        let err = engine.load_pages(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_page_tables_follow_tab_gaps() {
        let page = LopdfPage {
            number: 1,
            text: "Acme Corp\nItem\tQty\tAmount\nWidget\t2\t10.00".to_string(),
            min_cells_per_row: 2,
        };

        assert!(page.extract_text().is_some());
        assert_eq!(page.extract_tables().len(), 1);

        let blank = LopdfPage {
            number: 2,
            text: String::new(),
            min_cells_per_row: 2,
        };
        assert!(blank.extract_text().is_none());
        assert!(blank.extract_tables().is_empty());
    }
}
