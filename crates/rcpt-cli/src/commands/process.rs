//! Process command - run the pipeline for a single upload event.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use tracing::{debug, info};

use rcpt_core::models::config::RcptConfig;
use rcpt_core::{HandlerResponse, ObjectLocation, ReceiptProcessor};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Event file (S3 notification JSON), or "-" for stdin
    #[arg(short, long, conflicts_with_all = ["bucket", "key"], required_unless_present = "bucket")]
    event: Option<PathBuf>,

    /// Bucket of the uploaded object
    #[arg(short, long, requires = "key")]
    bucket: Option<String>,

    /// Key of the uploaded object, used as given (no URL decoding)
    #[arg(short, long, requires = "bucket")]
    key: Option<String>,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ProcessArgs, config: &RcptConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    let processor = ReceiptProcessor::from_config(config)?;

    let response = match (&args.event, &args.bucket, &args.key) {
        (Some(path), _, _) => {
            let event = read_event(path)?;
            info!("Processing event from {}", path.display());
            processor.handle_json(&event).await
        }
        (None, Some(bucket), Some(key)) => {
            processor
                .handle_object(&ObjectLocation::new(bucket.as_str(), key.as_str()))
                .await
        }
        _ => anyhow::bail!("Either --event or --bucket and --key must be given"),
    };

    print_response(&response, args.pretty)?;

    debug!("Total processing time: {:?}", start.elapsed());

    if !response.is_success() {
        anyhow::bail!("Receipt processing failed");
    }

    Ok(())
}

fn read_event(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }

    if !path.exists() {
        anyhow::bail!("Event file not found: {}", path.display());
    }

    Ok(std::fs::read_to_string(path)?)
}

pub fn print_response(response: &HandlerResponse, pretty: bool) -> anyhow::Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    println!("{}", output);
    Ok(())
}
