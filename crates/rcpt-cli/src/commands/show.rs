//! Show command - look up a stored receipt.

use std::sync::Arc;

use clap::Args;
use console::style;

use rcpt_core::SystemClock;
use rcpt_core::models::config::RcptConfig;
use rcpt_core::persistence::{JsonFileRepository, ReceiptRepository, StoredReceipt};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Receipt id
    #[arg(required = true)]
    receipt_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report suspicious extracted values
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per receipt
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ShowArgs, config: &RcptConfig) -> anyhow::Result<()> {
    let repository = open_repository(config);

    let receipt = repository
        .get_receipt(&args.receipt_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Receipt not found: {}", args.receipt_id))?;

    if args.validate {
        let issues = receipt.clone().into_record().validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    println!("{}", format_receipts(std::slice::from_ref(&receipt), args.format, false)?);

    Ok(())
}

/// Open the configured receipt table.
pub fn open_repository(config: &RcptConfig) -> JsonFileRepository {
    JsonFileRepository::new(config.persistence.table_path(), Arc::new(SystemClock))
}

/// Render receipts in the requested format. `as_list` keeps JSON output an
/// array even for a single receipt.
pub fn format_receipts(
    receipts: &[StoredReceipt],
    format: OutputFormat,
    as_list: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => match receipts {
            [single] if !as_list => Ok(serde_json::to_string_pretty(single)?),
            _ => Ok(serde_json::to_string_pretty(receipts)?),
        },
        OutputFormat::Csv => format_csv(receipts),
        OutputFormat::Text => Ok(receipts
            .iter()
            .map(format_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn format_csv(receipts: &[StoredReceipt]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "receipt_id",
        "date",
        "vendor",
        "total",
        "item_count",
        "s3_path",
        "processed_timestamp",
    ])?;

    for receipt in receipts {
        wtr.write_record([
            receipt.receipt_id.as_str(),
            receipt.date.as_str(),
            receipt.vendor.as_str(),
            receipt.total.as_str(),
            receipt.items.len().to_string().as_str(),
            receipt.s3_path.as_str(),
            receipt.processed_timestamp.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &StoredReceipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt: {}\n", receipt.receipt_id));
    output.push_str(&format!("Vendor: {}\n", receipt.vendor));
    output.push_str(&format!("Date: {}\n", receipt.date));
    output.push_str(&format!("Total: ${}\n", receipt.total));
    output.push_str(&format!("Source: {}\n", receipt.s3_path));

    if receipt.items.is_empty() {
        output.push_str("Items: none\n");
    } else {
        output.push_str("Items:\n");
        for item in &receipt.items {
            output.push_str(&format!(
                "  {} - ${} x {}\n",
                item.name, item.price, item.quantity
            ));
        }
    }

    output
}
