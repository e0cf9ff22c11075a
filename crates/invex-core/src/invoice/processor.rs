//! Document orchestration: pages in, one invoice record out.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use super::rules::{extract_metadata_with, extract_page_items, VendorNameExtractor};
use super::{InvoiceExtractor, Result};
use crate::error::{panic_message, ExtractionError};
use crate::models::config::ExtractionConfig;
use crate::models::invoice::InvoiceRecord;
use crate::pdf::{LayoutEngine, LopdfEngine, ParsedPage};

/// Runs the table and metadata rules over every page of a document.
///
/// Holds no per-request state, so one processor can serve any number of
/// requests.
#[derive(Debug, Clone, Default)]
pub struct DocumentProcessor<E = LopdfEngine> {
    engine: E,
    config: ExtractionConfig,
}

impl DocumentProcessor<LopdfEngine> {
    /// Create a processor backed by the default lopdf engine.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: LayoutEngine> DocumentProcessor<E> {
    /// Create a processor over a custom layout engine.
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            config: ExtractionConfig::default(),
        }
    }

    /// Set extraction options.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract an invoice record from the PDF at `path`.
    ///
    /// Never panics: engine failures, empty documents, and panics raised
    /// while reading pages all come back as an [`ExtractionError`].
    pub fn process_document(&self, path: &Path) -> Result<InvoiceRecord> {
        let start = Instant::now();
        info!("Processing {}", path.display());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(path)))
            .unwrap_or_else(|payload| Err(ExtractionError::Unexpected(panic_message(&*payload))));

        match &outcome {
            Ok(record) => info!(
                "Extracted {} line items from {} in {:?}",
                record.line_items.len(),
                path.display(),
                start.elapsed()
            ),
            Err(e) => info!("Extraction failed for {}: {}", path.display(), e),
        }

        outcome
    }

    fn run(&self, path: &Path) -> Result<InvoiceRecord> {
        let pages = self.engine.open(path)?;

        let mut all_text = String::new();
        let mut line_items = Vec::new();

        for (idx, page) in pages.iter().enumerate() {
            if let Some(text) = page.extract_text().filter(|t| !t.is_empty()) {
                all_text.push_str(&text);
                all_text.push('\n');
            }

            let tables = page.extract_tables();
            let items = extract_page_items(&tables);
            debug!(
                "Page {}: {} tables, {} line items",
                idx + 1,
                tables.len(),
                items.len()
            );
            line_items.extend(items);
        }

        if all_text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        let vendor = VendorNameExtractor::new().with_scan_lines(self.config.vendor_scan_lines);
        let metadata = extract_metadata_with(&all_text, &vendor);

        Ok(InvoiceRecord {
            vendor_name: metadata.vendor_name,
            vendor_address: None,
            invoice_number: metadata.invoice_number,
            invoice_date: metadata.invoice_date,
            total_amount: metadata.total_amount,
            currency: self.config.default_currency.clone(),
            line_items,
        })
    }
}

impl<E: LayoutEngine> InvoiceExtractor for DocumentProcessor<E> {
    fn extract(&self, path: &Path) -> Result<InvoiceRecord> {
        self.process_document(path)
    }
}

/// Extract an invoice record from `path` with the default engine and settings.
pub fn process_document(path: impl AsRef<Path>) -> Result<InvoiceRecord> {
    DocumentProcessor::new().process_document(path.as_ref())
}
