//! Core library for rule-based invoice extraction.
//!
//! This crate provides:
//! - A PDF layout engine seam (page text and text-layout tables)
//! - Line item extraction by mapping table headers to item fields
//! - Pattern rules for vendor, invoice number, date, and total amount
//! - The invoice record, its response envelope, and upload storage

pub mod error;
pub mod models;
pub mod pdf;
pub mod invoice;
pub mod storage;

pub use error::{ExtractionError, InvexError, PdfError, Result};
pub use models::config::InvexConfig;
pub use models::envelope::ExtractionResponse;
pub use models::invoice::{InvoiceRecord, LineItem};
pub use pdf::{LayoutEngine, LopdfEngine, ParsedPage, Table};
pub use invoice::{process_document, DocumentProcessor, InvoiceExtractor};
pub use storage::{DirectoryStore, StoredUpload, UploadStore};
