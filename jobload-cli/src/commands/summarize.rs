//! `jobload summarize`

use anyhow::{Context, Result};
use jobload_core::{check_lifecycle_order, RunSummary};
use jobload_output::JsonSink;
use serde_json::json;
use std::path::Path;
use tracing::warn;

use crate::cli::OutputFormat;

/// Summary of a persisted log plus the number of out-of-order terminal events
pub fn summarize_file(path: &Path) -> Result<(RunSummary, usize)> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read event log {:?}", path))?;
    let events = JsonSink::read_events(&data)
        .with_context(|| format!("Failed to parse event log {:?}", path))?;

    let violations = check_lifecycle_order(&events);
    for violation in violations.iter().take(10) {
        warn!(
            index = violation.index,
            job_id = %violation.job_id,
            event = %violation.event,
            "Terminal event without a preceding creation"
        );
    }

    Ok((RunSummary::from_events(&events), violations.len()))
}

pub fn handle_summarize(path: &Path, format: OutputFormat) -> Result<()> {
    let (summary, violations) = summarize_file(path)?;

    match format {
        OutputFormat::Text => {
            println!("{}", summary);
            if violations > 0 {
                println!("❌ {} lifecycle order violations", violations);
            }
        }
        OutputFormat::Json => {
            let value = json!({
                "summary": summary,
                "completion_rate": summary.completion_rate(),
                "order_violations": violations,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("Failed to format summary")?
            );
        }
    }
    Ok(())
}
