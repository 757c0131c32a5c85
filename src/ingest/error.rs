// src/ingest/error.rs
use thiserror::Error;

/// Errors produced by the CSV ingest pipeline.
///
/// Every variant is terminal for the current upload: the batch is rejected
/// as a whole and nothing is persisted. Row numbers are 1-based CSV line
/// numbers as a human would count them in the file (the header is row 1,
/// the first data row is row 2).
#[derive(Debug, Error)]
pub enum IngestError {
    /// A required column is absent from the header row after normalization.
    #[error("missing required column(s) in CSV header: {}", missing.join(", "))]
    MalformedHeader { missing: Vec<String> },

    /// A data row lacks a required value, or the value could not be parsed
    /// as a number.
    #[error("missing or unparseable value for '{field}' at row {row}")]
    MissingField { row: usize, field: &'static str },

    #[error("invalid date format at row {row}")]
    InvalidDate { row: usize },

    #[error("negative values not allowed at row {row} ('{field}')")]
    NegativeValue { row: usize, field: &'static str },

    #[error("churn rate cannot exceed 100% at row {row}")]
    ChurnBound { row: usize },

    /// Valid header but zero data rows. Treated as a hard error so an empty
    /// upload can never replace an owner's existing history.
    #[error("CSV contains a valid header but no data rows")]
    EmptyBatch,

    /// Low-level reader failure (malformed quoting, broken input).
    #[error("CSV read error: {0}")]
    Read(#[from] csv::Error),
}

impl IngestError {
    /// Stable machine-readable kind, used in logs and error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::MalformedHeader { .. } => "malformed_header",
            IngestError::MissingField { .. } => "missing_field",
            IngestError::InvalidDate { .. } => "invalid_date",
            IngestError::NegativeValue { .. } => "negative_value",
            IngestError::ChurnBound { .. } => "churn_bound",
            IngestError::EmptyBatch => "empty_batch",
            IngestError::Read(_) => "read",
        }
    }
}
