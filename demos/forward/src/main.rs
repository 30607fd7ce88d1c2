//! Forward Example
//!
//! Reads newline-delimited JSON objects from stdin and publishes them through
//! a named output from `httpout.toml` / `httpout.yaml`.
//!
//! # Usage
//!
//! ```bash
//! printf '{"message":"hello"}\n{"message":"world"}\n' \
//!     | cargo run --package httpout-forward -- --output collector --batch 2
//! ```
//!
//! With a configuration such as:
//!
//! ```yaml
//! outputs:
//!   - name: collector
//!     host: http://127.0.0.1:8080/ingest
//!     encapsulation:
//!       source: forward
//!       records: EVENTS
//!     encapsulation_sign: EVENTS
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use httpout::prelude::*;
use httpout::runtime::ConfigLoader;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "httpout-forward", about = "Forward stdin events to an HTTP sink")]
struct Args {
    /// Name of the output to publish through.
    #[arg(short, long)]
    output: String,

    /// Explicit configuration file instead of the search path.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Events per request.
    #[arg(short, long, default_value_t = 1)]
    batch: usize,

    /// Per-request deadline in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log failures as errors instead of warnings.
    #[arg(long)]
    guaranteed: bool,
}

fn parse_event(line: &str) -> Result<Event> {
    match serde_json::from_str(line)? {
        serde_json::Value::Object(event) => Ok(event),
        other => bail!("expected a JSON object, got {other}"),
    }
}

/// Options for the final flush: same deadline and mode, but not cancellable,
/// so events read before Ctrl+C are still sent.
fn drain_options(opts: &PublishOptions) -> PublishOptions {
    PublishOptions {
        cancel: None,
        ..opts.clone()
    }
}

async fn flush(output: &dyn Outputer, opts: &PublishOptions, pending: &mut Vec<Event>) {
    if pending.is_empty() {
        return;
    }

    let count = pending.len();
    match output
        .publish_events(&NoopSignaler, opts, std::mem::take(pending))
        .await
    {
        Ok(()) => info!(count, "Batch delivered"),
        Err(e) => warn!(count, error = %e, "Batch dropped"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().file(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("failed to load configuration")?;
    logging::init_from_config(&config.logging);

    let registry = OutputRegistry::from_config(&config)?;
    let output = registry.outputer(&args.output)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut opts = PublishOptions::new().with_cancel(cancel.clone());
    if args.guaranteed {
        opts = opts.guaranteed();
    }
    if let Some(ms) = args.timeout_ms {
        opts = opts.with_timeout(Duration::from_millis(ms));
    }

    let batch = args.batch.max(1);
    let mut pending = Vec::with_capacity(batch);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let read_result = loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_event(line) {
            Ok(event) => pending.push(event),
            Err(e) => warn!("Skipping malformed line: {e}"),
        }

        if pending.len() >= batch {
            flush(output.as_ref(), &opts, &mut pending).await;
        }
    };

    flush(output.as_ref(), &drain_options(&opts), &mut pending).await;

    read_result.context("failed to read stdin")?;
    info!("Input closed, exiting");
    Ok(())
}
