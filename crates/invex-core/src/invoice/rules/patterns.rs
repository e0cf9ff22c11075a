//! Common regex patterns for invoice metadata extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number: label, optional ":"/"#", then the identifier (group 2)
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(invoice\s*(?:no\.?|number|#)|inv\.?\s*no\.?|bill\s*(?:no\.?|#))\s*[:#]?\s*([a-zA-Z0-9/-]{3,})"
    ).unwrap();

    // Dates: ISO first, then loose D/M/Y with -, / or . separators
    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"(\d{4}-\d{2}-\d{2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4})"
    ).unwrap();

    // Total amount: label, optional ":", then the amount with optional symbol (group 2)
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)(total\s*(?:amount|due|value)?|grand\s*total|amount\s*due)\s*:?\s*([$€£]?\s*[\d,]+\.?\d{2})"
    ).unwrap();
}
