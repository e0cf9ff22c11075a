//! Rule-based extractors for invoice tables and text.

pub mod keywords;
pub mod metadata;
pub mod patterns;
pub mod table;

pub use metadata::{
    extract_metadata, extract_metadata_with, InvoiceDateExtractor, InvoiceMetadata,
    InvoiceNumberExtractor, TotalAmountExtractor, VendorNameExtractor,
};
pub use table::{extract_items, extract_page_items, ColumnMap};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
