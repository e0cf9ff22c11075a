//! Keyword sets shared by header detection, column mapping, and row filtering.
//!
//! All matching is substring containment on lower-cased text.

/// A row containing any of these is a candidate header row.
pub const HEADER_KEYWORDS: &[&str] = &[
    "qty",
    "quantity",
    "price",
    "amount",
    "total",
    "description",
    "disc",
    "item",
];

/// Header labels for the description column.
pub const DESCRIPTION_KEYWORDS: &[&str] = &["desc", "item", "product", "particular"];

/// Header labels for the quantity column.
pub const QUANTITY_KEYWORDS: &[&str] = &["qty", "quantity", "count"];

/// Header labels for the unit price column.
pub const UNIT_PRICE_KEYWORDS: &[&str] = &["price", "rate", "unit"];

/// Header labels for the line total column.
pub const TOTAL_PRICE_KEYWORDS: &[&str] = &["amount", "total", "value", "sum"];

/// Data rows containing any of these are summary/footer rows.
pub const FOOTER_KEYWORDS: &[&str] = &["total", "subtotal", "tax", "vat"];

/// Leading lines containing any of these are not the vendor name.
pub const VENDOR_EXCLUDE_KEYWORDS: &[&str] = &["invoice", "bill to", "ship to", "order"];

/// Whether `haystack` contains any of `keywords`.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any() {
        assert!(contains_any("unit price", UNIT_PRICE_KEYWORDS));
        assert!(contains_any("subtotal", FOOTER_KEYWORDS));
        assert!(!contains_any("widget", HEADER_KEYWORDS));
        assert!(!contains_any("", DESCRIPTION_KEYWORDS));
    }
}
