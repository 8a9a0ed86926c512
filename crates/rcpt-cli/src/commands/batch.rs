//! Batch processing command for multiple event files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, warn};

use rcpt_core::ReceiptProcessor;
use rcpt_core::models::config::RcptConfig;
use rcpt_core::pipeline::HandlerBody;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Event files glob pattern (e.g. "events/*.json")
    #[arg(required = true)]
    input: String,

    /// Write a CSV summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single event file.
struct BatchResult {
    path: PathBuf,
    receipt_id: Option<String>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config: &RcptConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching event files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} event files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} events")?
            .progress_chars("=>-"),
    );

    let processor = ReceiptProcessor::from_config(config)?;
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();

        let response = match fs::read_to_string(&path) {
            Ok(event) => processor.handle_json(&event).await,
            Err(e) => rcpt_core::HandlerResponse::failure(format!("Failed to read event: {}", e)),
        };

        let processing_time_ms = file_start.elapsed().as_millis() as u64;
        pb.inc(1);

        match response.body {
            HandlerBody::Success { receipt_id, .. } => results.push(BatchResult {
                path,
                receipt_id: Some(receipt_id),
                error: None,
                processing_time_ms,
            }),
            HandlerBody::Failure { error: message } => {
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), message);
                    results.push(BatchResult {
                        path,
                        receipt_id: None,
                        error: Some(message),
                        processing_time_ms,
                    });
                } else {
                    pb.abandon();
                    error!("Failed to process {}: {}", path.display(), message);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), message);
                }
            }
        }
    }

    pb.finish_and_clear();

    for result in &results {
        match (&result.receipt_id, &result.error) {
            (Some(receipt_id), _) => println!(
                "{} {} -> {} ({}ms)",
                style("✓").green(),
                result.path.display(),
                receipt_id,
                result.processing_time_ms
            ),
            (None, Some(error)) => println!(
                "{} {}: {}",
                style("✗").red(),
                result.path.display(),
                error
            ),
            (None, None) => {}
        }
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let succeeded = results.iter().filter(|r| r.receipt_id.is_some()).count();
    println!(
        "{} Processed {}/{} events in {:.1}s",
        style("ℹ").blue(),
        succeeded,
        results.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// One row of the CSV summary.
#[derive(Serialize)]
struct SummaryRow<'a> {
    event_file: String,
    status: &'static str,
    receipt_id: &'a str,
    error: &'a str,
    processing_time_ms: u64,
}

fn write_summary(path: &PathBuf, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        wtr.serialize(SummaryRow {
            event_file: result.path.display().to_string(),
            status: if result.receipt_id.is_some() { "ok" } else { "failed" },
            receipt_id: result.receipt_id.as_deref().unwrap_or(""),
            error: result.error.as_deref().unwrap_or(""),
            processing_time_ms: result.processing_time_ms,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
