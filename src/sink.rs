use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode, header::CONTENT_RANGE};
use serde_json::Value;

use crate::common::truncate_for_log;
use crate::record::IcdCodeRecord;

/// Conflict-resolution directive for a single bulk insert request. Passed
/// per request so a conflict retry on one batch cannot leak merge semantics
/// into any other batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictMode {
    FailOnDuplicate,
    MergeDuplicates,
}

impl ConflictMode {
    fn prefer_header(self) -> &'static str {
        match self {
            ConflictMode::FailOnDuplicate => "return=minimal",
            ConflictMode::MergeDuplicates => "return=minimal,resolution=merge-duplicates",
        }
    }
}

/// Terminal outcome of one bulk insert request. Transport and HTTP failures
/// are data here, not process-ending errors; the uploader decides what a
/// failed batch means for the run.
#[derive(Debug)]
pub enum BatchOutcome {
    Inserted,
    Conflict { body: String },
    Failed { status: Option<StatusCode>, body: String },
}

pub struct Sink {
    client: Client,
    base_url: String,
    service_key: String,
}

impl Sink {
    pub fn new(client: Client, base_url: &str, service_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    pub async fn insert_batch(
        &self,
        table: &str,
        rows: &[IcdCodeRecord],
        mode: ConflictMode,
    ) -> BatchOutcome {
        let request = self
            .authed(self.client.post(self.table_url(table)))
            .header("Prefer", mode.prefer_header())
            .json(rows);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return BatchOutcome::Inserted;
                }
                let body = truncate_for_log(&response.text().await.unwrap_or_default());
                if status == StatusCode::CONFLICT {
                    BatchOutcome::Conflict { body }
                } else {
                    BatchOutcome::Failed {
                        status: Some(status),
                        body,
                    }
                }
            }
            Err(err) => BatchOutcome::Failed {
                status: None,
                body: err.to_string(),
            },
        }
    }

    /// Total row count for the table, read from the Content-Range header of a
    /// HEAD request with an exact-count preference.
    pub async fn count(&self, table: &str) -> Result<u64> {
        let response = self
            .authed(self.client.head(self.table_url(table)))
            .query(&[("select", "code"), ("limit", "1")])
            .header("Prefer", "count=exact")
            .send()
            .await
            .with_context(|| format!("Count request failed for table {table}"))?
            .error_for_status()
            .with_context(|| format!("Count request rejected for table {table}"))?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(content_range_total)
            .unwrap_or(0);
        Ok(total)
    }

    pub async fn sample(&self, table: &str, limit: usize) -> Result<Vec<Value>> {
        let limit = limit.to_string();
        let response = self
            .authed(self.client.get(self.table_url(table)))
            .query(&[
                ("select", "code,short_title,chapter"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Sample request failed for table {table}"))?
            .error_for_status()
            .with_context(|| format!("Sample request rejected for table {table}"))?;

        response
            .json::<Vec<Value>>()
            .await
            .with_context(|| format!("Invalid sample response JSON for table {table}"))
    }
}

/// Parse the total out of a Content-Range value such as "0-0/74260".
/// An unknown total ("*") yields None.
fn content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total_reads_the_trailing_count() {
        assert_eq!(content_range_total("0-0/74260"), Some(74260));
        assert_eq!(content_range_total("*/0"), Some(0));
        assert_eq!(content_range_total("0-499/12345"), Some(12345));
    }

    #[test]
    fn content_range_total_treats_unknown_as_none() {
        assert_eq!(content_range_total("0-0/*"), None);
        assert_eq!(content_range_total(""), None);
        assert_eq!(content_range_total("garbage"), None);
    }

    #[test]
    fn conflict_mode_selects_the_prefer_header() {
        assert_eq!(ConflictMode::FailOnDuplicate.prefer_header(), "return=minimal");
        assert_eq!(
            ConflictMode::MergeDuplicates.prefer_header(),
            "return=minimal,resolution=merge-duplicates"
        );
    }

    #[test]
    fn sink_trims_trailing_slash_from_base_url() {
        let sink = Sink::new(
            Client::new(),
            "https://project.supabase.co/",
            "service-key",
        );
        assert_eq!(
            sink.table_url("icd10_codes"),
            "https://project.supabase.co/rest/v1/icd10_codes"
        );
    }
}
