// src/ingest/mod.rs
//! # CSV Ingest Pipeline
//! Raw upload bytes to validated, owner-stamped [`MetricRecord`]s.
//!
//! Single pass, no internal state: header normalization, row parsing,
//! per-row validation, then assembly. Validation is atomic over the whole
//! batch; the first invalid row aborts the upload and nothing is returned.

pub mod error;
pub mod header;
pub mod rows;
pub mod validate;

pub use error::IngestError;
pub use header::{normalize_header, HeaderMap, REQUIRED_FIELDS};
pub use rows::{CellValue, RawRow};
pub use validate::{parse_date, validate_row, ValidRow};

use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::record::MetricRecord;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_rows_total",
            "Data rows accepted across successful uploads."
        );
        describe_counter!(
            "ingest_rejected_total",
            "Uploads rejected by the ingest pipeline."
        );
    });
}

/// Parse and validate one uploaded CSV document for `owner_id`.
///
/// On success returns the full batch of records in input order, each stamped
/// with `owner_id` and a single upload timestamp. On failure returns the
/// first [`IngestError`] encountered and no records; the batch is never
/// partially accepted.
pub fn parse_metrics_csv(text: &str, owner_id: &str) -> Result<Vec<MetricRecord>, IngestError> {
    ensure_metrics_described();

    match run_pipeline(text, owner_id) {
        Ok(records) => {
            counter!("ingest_rows_total").increment(records.len() as u64);
            tracing::debug!(owner = owner_id, rows = records.len(), "csv batch accepted");
            Ok(records)
        }
        Err(e) => {
            counter!("ingest_rejected_total").increment(1);
            tracing::debug!(owner = owner_id, kind = e.kind(), "csv batch rejected");
            Err(e)
        }
    }
}

fn run_pipeline(text: &str, owner_id: &str) -> Result<Vec<MetricRecord>, IngestError> {
    // flexible: short rows surface as missing fields with row context,
    // instead of a positional reader error
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = {
        let record = reader.headers()?;
        HeaderMap::from_fields(record.iter())?
    };

    let mut validated = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based CSV line number; the header is row 1. Empty lines are
        // skipped by the reader and never counted.
        let row = idx + 2;
        let raw = rows::extract_row(&headers, &record);
        validated.push(validate_row(&raw, row)?);
    }

    if validated.is_empty() {
        return Err(IngestError::EmptyBatch);
    }

    Ok(assemble(validated, owner_id))
}

/// Stamp each validated row with the owner and one batch-wide timestamp,
/// preserving input order. No error conditions of its own.
fn assemble(rows: Vec<ValidRow>, owner_id: &str) -> Vec<MetricRecord> {
    let uploaded_at = Utc::now();
    rows.into_iter()
        .map(|r| MetricRecord {
            owner_id: owner_id.to_string(),
            date: r.date,
            mrr: r.mrr,
            users: r.users.trunc() as u64,
            churn: r.churn,
            new_users: r.new_users.trunc() as u64,
            revenue: r.revenue,
            uploaded_at,
        })
        .collect()
}
