use anyhow::Result;
use serde_json::Value;

use crate::common::format_count;
use crate::sink::Sink;

pub const SAMPLE_LIMIT: usize = 5;

/// Read-only sanity check against the remote table: total row count plus a
/// small sample for human inspection. Safe to run before any upload, where
/// it reports a zero count and an empty sample.
pub async fn verify_table(sink: &Sink, table: &str) -> Result<()> {
    println!("Verifying table {table}...");

    let total = sink.count(table).await?;
    println!("Total rows in {table}: {}", format_count(total as usize));

    let rows = sink.sample(table, SAMPLE_LIMIT).await?;
    if rows.is_empty() {
        println!("No sample rows returned (table is empty).");
        return Ok(());
    }

    println!("Sample rows:");
    for row in &rows {
        println!("  {}", format_sample_row(row));
    }
    Ok(())
}

fn format_sample_row(row: &Value) -> String {
    let code = row.get("code").and_then(Value::as_str).unwrap_or("?");
    let title = row.get("short_title").and_then(Value::as_str).unwrap_or("");
    let chapter = row.get("chapter").and_then(Value::as_str).unwrap_or("");
    format!("{code}: {title} [{chapter}]")
}
