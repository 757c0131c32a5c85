//! # Metric Records
//! The persisted per-period metric record and its wire shape.
//!
//! One record is one reporting period (usually a month) of SaaS metrics for
//! one owner. Records are produced by the ingest pipeline or the demo
//! generator and consumed by storage, aggregation, and insight generation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A validated, owner-stamped metric data point.
///
/// Wire field names are camelCase (`ownerId`, `newUsers`, `uploadedAt`) so
/// the dashboard frontend can consume records unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// Opaque account identifier supplied by the caller, never read from the file.
    pub owner_id: String,
    /// Reporting period date (no time-of-day semantics).
    pub date: NaiveDate,
    /// Monthly recurring revenue, >= 0.
    pub mrr: f64,
    /// Total user count at period end.
    pub users: u64,
    /// Churn percentage in [0, 100].
    pub churn: f64,
    /// New sign-ups in the period.
    pub new_users: u64,
    /// Total revenue for the period, >= 0.
    pub revenue: f64,
    /// Server-side timestamp, one value per uploaded batch.
    pub uploaded_at: DateTime<Utc>,
}
