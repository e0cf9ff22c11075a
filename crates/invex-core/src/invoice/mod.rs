//! Invoice extraction: per-page table items plus document-wide metadata.

mod processor;
pub mod rules;

pub use processor::{process_document, DocumentProcessor};

use std::path::Path;

use crate::error::ExtractionError;
use crate::models::invoice::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice extractors.
pub trait InvoiceExtractor {
    /// Extract an invoice record from the PDF at `path`.
    fn extract(&self, path: &Path) -> Result<InvoiceRecord>;
}
