//! Query command - list receipts in a date range.

use clap::Args;
use console::style;

use rcpt_core::models::config::RcptConfig;
use rcpt_core::persistence::{ReceiptRepository, parse_date_bound};

use super::show::{OutputFormat, format_receipts, open_repository};

/// Arguments for the query command.
#[derive(Args)]
pub struct QueryArgs {
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    from: String,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    to: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: QueryArgs, config: &RcptConfig) -> anyhow::Result<()> {
    let start = parse_date_bound(&args.from)?;
    let end = parse_date_bound(&args.to)?;

    let repository = open_repository(config);
    let receipts = repository.query_by_date(start, end).await?;

    if receipts.is_empty() {
        eprintln!(
            "{} No receipts between {} and {}",
            style("ℹ").blue(),
            start,
            end
        );
    }

    println!("{}", format_receipts(&receipts, args.format, true)?);

    Ok(())
}
