use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::common::format_count;
use crate::record::IcdCodeRecord;
use crate::sink::{BatchOutcome, ConflictMode, Sink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub total: usize,
    pub uploaded: usize,
    pub failed: usize,
}

impl UploadSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.uploaded as f64 / self.total as f64) * 100.0
        }
    }
}

pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}

fn apply_upload_progress_style(progress: &ProgressBar) {
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{elapsed_precise}] [{bar:32.magenta/blue}] \
{pos}/{len} ({percent}%) {per_sec} eta {eta_precise} {msg}",
    ) {
        progress.set_style(style.progress_chars("=> "));
    }
}

/// Submit the record sequence to the sink in contiguous fixed-size batches,
/// one blocking round trip at a time. A duplicate-key conflict triggers a
/// single resubmission of the same batch under merge-duplicates semantics;
/// any other failure marks the batch failed and the run moves on. Partial
/// success is an accepted terminal state reported through the summary.
pub async fn upload_in_batches(
    sink: &Sink,
    table: &str,
    records: &[IcdCodeRecord],
    batch_size: usize,
) -> UploadSummary {
    let batch_size = batch_size.max(1);
    let total_batches = batch_count(records.len(), batch_size);
    println!(
        "Uploading {} codes to {} in {} batches of up to {}...",
        format_count(records.len()),
        table,
        format_count(total_batches),
        batch_size
    );

    let progress = ProgressBar::new(records.len() as u64);
    progress.set_prefix("UPLOAD");
    apply_upload_progress_style(&progress);
    progress.enable_steady_tick(Duration::from_millis(250));

    let mut summary = UploadSummary {
        total: records.len(),
        ..UploadSummary::default()
    };

    for (index, batch) in records.chunks(batch_size).enumerate() {
        let batch_num = index + 1;
        match sink
            .insert_batch(table, batch, ConflictMode::FailOnDuplicate)
            .await
        {
            BatchOutcome::Inserted => {
                summary.uploaded += batch.len();
            }
            BatchOutcome::Conflict { body } => {
                progress.println(format!(
                    "Batch {batch_num}/{total_batches} hit a duplicate-key conflict; retrying as upsert. Response: {body}"
                ));
                match sink
                    .insert_batch(table, batch, ConflictMode::MergeDuplicates)
                    .await
                {
                    BatchOutcome::Inserted => {
                        summary.uploaded += batch.len();
                        progress.println(format!(
                            "Batch {batch_num}/{total_batches} upsert retry succeeded."
                        ));
                    }
                    BatchOutcome::Conflict { body }
                    | BatchOutcome::Failed { body, .. } => {
                        summary.failed += batch.len();
                        progress.println(format!(
                            "Batch {batch_num}/{total_batches} upsert retry failed: {body}"
                        ));
                    }
                }
            }
            BatchOutcome::Failed { status, body } => {
                summary.failed += batch.len();
                let status = status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "request error".to_string());
                progress.println(format!(
                    "Batch {batch_num}/{total_batches} failed ({status}): {body}"
                ));
            }
        }

        progress.inc(batch.len() as u64);
        progress.set_message(format!(
            "batch {batch_num}/{total_batches} uploaded={} failed={}",
            summary.uploaded, summary.failed
        ));
    }

    progress.finish_with_message(format!(
        "done: uploaded={} failed={}",
        summary.uploaded, summary.failed
    ));
    summary
}
