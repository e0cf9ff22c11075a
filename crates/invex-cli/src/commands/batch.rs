//! Batch processing command for multiple invoice PDFs.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use invex_core::{ExtractionResponse, InvoiceRecord};

use super::process::{format_response, OutputFormat};
use super::{build_processor, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    response: ExtractionResponse,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Each file gets its own blocking task; results arrive in input order.
    let processor = Arc::new(build_processor(&config));
    let mut pending = stream::iter(files)
        .map(|path| {
            let processor = Arc::clone(&processor);
            tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let result = processor.process_document(&path);
                (path, result, file_start.elapsed().as_millis() as u64)
            })
        })
        .buffered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(joined) = pending.next().await {
        let (path, result, processing_time_ms) = joined?;

        if let Err(e) = &result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", path.display(), e);
            } else {
                error!("Failed to process {}: {}", path.display(), e);
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        }

        results.push(ProcessResult {
            path,
            response: ExtractionResponse::from_result(None, result),
            processing_time_ms,
        });
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        let written: Vec<&ProcessResult> =
            results.iter().filter(|r| r.response.is_success()).collect();
        let paths: Vec<&Path> = written.iter().map(|r| r.path.as_path()).collect();
        let names = output_names(&paths, args.format.extension());

        for (result, name) in written.iter().zip(names) {
            let output_path = output_dir.join(name);
            fs::write(&output_path, format_response(&result.response, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&ProcessResult> = results.iter().filter(|r| !r.response.is_success()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let ExtractionResponse::Error { error } = &result.response {
                println!("  - {}: {}", result.path.display(), error);
            }
        }
    }

    Ok(())
}

/// Output file name for each input, in order.
///
/// Names come from the file stem. When two inputs share a stem (the same
/// name in different directories) later ones get `_2`, `_3`, ... appended.
fn output_names(paths: &[&Path], extension: &str) -> Vec<String> {
    let mut taken = HashSet::new();

    paths
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");

            let mut name = format!("{}.{}", stem, extension);
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{}_{}.{}", stem, n, extension);
            }
            if n > 1 {
                warn!("Output for {} renamed to {} to avoid a clash", path.display(), name);
            }
            name
        })
        .collect()
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor_name",
        "invoice_number",
        "invoice_date",
        "total_amount",
        "currency",
        "line_items",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        let time = result.processing_time_ms.to_string();

        let row = match &result.response {
            ExtractionResponse::Success { extracted_data, .. } => {
                summary_row(filename, extracted_data, time)
            }
            ExtractionResponse::Error { error } => [
                filename,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                time,
                error.clone(),
            ],
        };
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn summary_row(filename: String, record: &InvoiceRecord, time: String) -> [String; 10] {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        filename,
        "success".to_string(),
        field(&record.vendor_name),
        field(&record.invoice_number),
        field(&record.invoice_date),
        field(&record.total_amount),
        record.currency.clone(),
        record.line_items.len().to_string(),
        time,
        String::new(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_are_unique() {
        let paths = [
            Path::new("2024/jan/a.pdf"),
            Path::new("2024/feb/a.pdf"),
            Path::new("2024/feb/b.pdf"),
            Path::new("2024/mar/a.pdf"),
        ];

        assert_eq!(
            output_names(&paths, "json"),
            vec!["a.json", "a_2.json", "b.json", "a_3.json"]
        );
    }

    #[test]
    fn test_output_names_skip_existing_suffixes() {
        let paths = [Path::new("x/a_2.pdf"), Path::new("x/a.pdf"), Path::new("y/a.pdf")];

        assert_eq!(
            output_names(&paths, "csv"),
            vec!["a_2.csv", "a.csv", "a_3.csv"]
        );
    }
}
