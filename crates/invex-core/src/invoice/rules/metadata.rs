//! Scalar field extraction from the full document text.
//!
//! Each field has its own extractor and they all read the same text
//! independently. A field with no match stays `None`.

use tracing::trace;

use super::keywords::{contains_any, VENDOR_EXCLUDE_KEYWORDS};
use super::patterns::{INVOICE_DATE, INVOICE_NUMBER, TOTAL_AMOUNT};
use super::FieldExtractor;

/// Number of leading lines searched for the vendor name by default.
pub const DEFAULT_VENDOR_SCAN_LINES: usize = 5;

/// Scalar invoice fields recovered from text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceMetadata {
    pub vendor_name: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub total_amount: Option<String>,
}

/// Vendor name: the first clean line near the top of the document.
#[derive(Debug, Clone)]
pub struct VendorNameExtractor {
    scan_lines: usize,
}

impl VendorNameExtractor {
    pub fn new() -> Self {
        Self {
            scan_lines: DEFAULT_VENDOR_SCAN_LINES,
        }
    }

    /// Set how many leading non-empty lines are examined.
    pub fn with_scan_lines(mut self, scan_lines: usize) -> Self {
        self.scan_lines = scan_lines;
        self
    }
}

impl Default for VendorNameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorNameExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(self.scan_lines)
            .filter(|line| !contains_any(&line.to_lowercase(), VENDOR_EXCLUDE_KEYWORDS))
            .filter(|line| line.chars().count() > 3)
            .map(str::to_string)
            .collect()
    }
}

/// Invoice number following an "Invoice No." / "Bill #" style label.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceNumberExtractor;

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        INVOICE_NUMBER
            .captures(text)
            .map(|caps| caps[2].trim().to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        INVOICE_NUMBER
            .captures_iter(text)
            .map(|caps| caps[2].trim().to_string())
            .collect()
    }
}

/// First date-shaped substring, kept verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceDateExtractor;

impl FieldExtractor for InvoiceDateExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        INVOICE_DATE
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        INVOICE_DATE
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .collect()
    }
}

/// Amount following a "Total" / "Amount Due" style label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalAmountExtractor;

impl FieldExtractor for TotalAmountExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        TOTAL_AMOUNT
            .captures(text)
            .map(|caps| caps[2].trim().to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        TOTAL_AMOUNT
            .captures_iter(text)
            .map(|caps| caps[2].trim().to_string())
            .collect()
    }
}

/// Run every metadata rule with default settings.
pub fn extract_metadata(text: &str) -> InvoiceMetadata {
    extract_metadata_with(text, &VendorNameExtractor::new())
}

/// Run every metadata rule, using `vendor` for the vendor name.
pub fn extract_metadata_with(text: &str, vendor: &VendorNameExtractor) -> InvoiceMetadata {
    let metadata = InvoiceMetadata {
        vendor_name: vendor.extract(text),
        invoice_number: InvoiceNumberExtractor.extract(text),
        invoice_date: InvoiceDateExtractor.extract(text),
        total_amount: TotalAmountExtractor.extract(text),
    };
    trace!("Metadata: {:?}", metadata);
    metadata
}
