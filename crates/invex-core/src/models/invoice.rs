//! Invoice record produced by one extraction request.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column headers for the flat per-line-item CSV export.
pub const CSV_COLUMNS: [&str; 7] = [
    "Vendor Name",
    "Invoice Number",
    "Invoice Date",
    "Description",
    "Quantity",
    "Unit Price",
    "Total Price",
];

/// Structured fields extracted from one invoice PDF.
///
/// Optional fields serialize as `null` so the response always has the same
/// shape. Values are stored exactly as they appeared in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Vendor (issuer) name.
    pub vendor_name: Option<String>,

    /// Vendor address. Reserved; never populated by the current rules.
    pub vendor_address: Option<String>,

    /// Invoice number/identifier.
    pub invoice_number: Option<String>,

    /// Invoice date, verbatim.
    pub invoice_date: Option<String>,

    /// Total amount, verbatim including any currency symbol.
    pub total_amount: Option<String>,

    /// Currency marker.
    pub currency: String,

    /// Line items in page, table, row order.
    pub line_items: Vec<LineItem>,
}

impl Default for InvoiceRecord {
    fn default() -> Self {
        Self {
            vendor_name: None,
            vendor_address: None,
            invoice_number: None,
            invoice_date: None,
            total_amount: None,
            currency: "$".to_string(),
            line_items: Vec::new(),
        }
    }
}

/// A single line item row from an invoice table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    /// Price per unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,

    /// Line total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<String>,
}

impl LineItem {
    /// Whether the item carries a description or a line total.
    ///
    /// Items failing this check are never emitted.
    pub fn has_content(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.description) || filled(&self.total_price)
    }
}

impl InvoiceRecord {
    /// Flat rows for CSV export, one per line item.
    pub fn csv_rows(&self) -> Vec<[String; 7]> {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();

        self.line_items
            .iter()
            .map(|item| {
                [
                    field(&self.vendor_name),
                    field(&self.invoice_number),
                    field(&self.invoice_date),
                    field(&item.description),
                    field(&item.quantity),
                    field(&item.unit_price),
                    field(&item.total_price),
                ]
            })
            .collect()
    }

    /// Check the record for internal consistency.
    ///
    /// Returns human-readable warnings; the record itself is never modified.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_number.is_none() {
            issues.push("Missing invoice number".to_string());
        }

        if let Some(date) = &self.invoice_date {
            if parse_loose_date(date).is_none() {
                issues.push(format!("Invoice date is not a calendar date: {}", date));
            }
        }

        if self.line_items.is_empty() {
            issues.push("No line items found".to_string());
        }

        let total = match &self.total_amount {
            None => {
                issues.push("Missing total amount".to_string());
                None
            }
            Some(raw) => {
                let parsed = parse_amount(raw);
                if parsed.is_none() {
                    issues.push(format!("Total amount is not a number: {}", raw));
                }
                parsed
            }
        };

        // Only compare when every line total is readable.
        let line_totals: Option<Vec<Decimal>> = self
            .line_items
            .iter()
            .map(|item| item.total_price.as_deref().and_then(parse_amount))
            .collect();

        if let (Some(total), Some(line_totals)) = (total, line_totals) {
            if !line_totals.is_empty() {
                let sum: Decimal = line_totals.iter().sum();
                if sum != total {
                    issues.push(format!(
                        "Line item totals ({}) do not match total amount ({})",
                        sum, total
                    ));
                }
            }
        }

        issues
    }
}

/// Parse an amount such as `$1,234.56` or `1234.56` into a decimal.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Interpret a verbatim date in any of the accepted orderings.
///
/// `YYYY-MM-DD` is read as such; otherwise day-first is tried before
/// month-first. Two-digit years are taken as 20xx.
pub fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(['-', '/', '.']).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }

    let year = if parts[2].len() == 2 {
        2000 + nums[2] as i32
    } else {
        nums[2] as i32
    };

    NaiveDate::from_ymd_opt(year, nums[1], nums[0])
        .or_else(|| NaiveDate::from_ymd_opt(year, nums[0], nums[1]))
}
