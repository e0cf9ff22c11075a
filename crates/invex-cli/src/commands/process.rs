//! Process command - extract data from a single invoice PDF.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invex_core::models::invoice::{InvoiceRecord, CSV_COLUMNS};
use invex_core::storage::{DirectoryStore, UploadStore};
use invex_core::ExtractionResponse;

use super::{build_processor, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Copy the file into the upload directory first and report its file id
    #[arg(long)]
    store: bool,

    /// Report consistency warnings for the extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON response body
    Json,
    /// One CSV row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing this format to a directory.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let (path, file_id) = if args.store {
        pb.set_message("Storing upload...");
        let name = args
            .input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.pdf");
        let store = DirectoryStore::new(&config.storage.upload_dir);
        let stored = store.store(name, &fs::read(&args.input)?)?;
        (stored.path, Some(stored.file_id))
    } else {
        (args.input.clone(), None)
    };

    pb.set_message("Extracting invoice data...");
    let processor = build_processor(&config);
    let result = tokio::task::spawn_blocking(move || processor.process_document(&path)).await?;
    pb.finish_and_clear();

    let response = ExtractionResponse::from_result(file_id, result);

    if args.validate {
        if let Some(record) = response.record() {
            let issues = record.validate();
            if !issues.is_empty() {
                eprintln!("{}", style("Validation issues:").yellow());
                for issue in &issues {
                    eprintln!("  - {}", issue);
                }
            }
        }
    }

    let output = format_response(&response, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    match response {
        ExtractionResponse::Error { error } => anyhow::bail!("Extraction failed: {}", error),
        ExtractionResponse::Success { .. } => Ok(()),
    }
}

/// Render a response in the requested format.
pub fn format_response(response: &ExtractionResponse, format: OutputFormat) -> anyhow::Result<String> {
    match (format, response.record()) {
        (OutputFormat::Json, _) => Ok(serde_json::to_string_pretty(response)?),
        (OutputFormat::Csv, Some(record)) => format_csv(record),
        (OutputFormat::Text, Some(record)) => Ok(format_text(record)),
        (_, None) => Ok(serde_json::to_string(response)?),
    }
}

/// Flat CSV export: one row per line item.
pub fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_COLUMNS)?;
    for row in record.csv_rows() {
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Human-readable summary of a record.
pub fn format_text(record: &InvoiceRecord) -> String {
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let mut output = String::new();

    output.push_str(&format!("Vendor:  {}\n", field(&record.vendor_name)));
    output.push_str(&format!("Invoice: {}\n", field(&record.invoice_number)));
    output.push_str(&format!("Date:    {}\n", field(&record.invoice_date)));
    output.push_str(&format!(
        "Total:   {} ({})\n",
        field(&record.total_amount),
        record.currency
    ));
    output.push('\n');

    if record.line_items.is_empty() {
        output.push_str("No line items found.\n");
    } else {
        output.push_str("Line items:\n");
        for item in &record.line_items {
            output.push_str(&format!(
                "  - {} | qty {} | unit {} | total {}\n",
                field(&item.description),
                field(&item.quantity),
                field(&item.unit_price),
                field(&item.total_price),
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use invex_core::LineItem;

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            vendor_name: Some("Acme Corp".to_string()),
            invoice_number: Some("INV-1".to_string()),
            line_items: vec![LineItem {
                description: Some("Widget, large".to_string()),
                quantity: Some("2".to_string()),
                unit_price: None,
                total_price: Some("10.00".to_string()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&record()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Vendor Name,Invoice Number,Invoice Date,Description,Quantity,Unit Price,Total Price"
        );
        assert_eq!(lines[1], "Acme Corp,INV-1,,\"Widget, large\",2,,10.00");
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&record());
        assert!(text.contains("Vendor:  Acme Corp"));
        assert!(text.contains("Date:    -"));
        assert!(text.contains("Widget, large | qty 2 | unit - | total 10.00"));
    }

    #[test]
    fn test_error_response_renders_as_json_in_any_format() {
        let response = ExtractionResponse::error("No text could be extracted from this PDF.");
        let out = format_response(&response, OutputFormat::Csv).unwrap();
        assert_eq!(out, r#"{"error":"No text could be extracted from this PDF."}"#);
    }
}
