// src/ingest/rows.rs
//! Row parsing: one CSV line into an untyped-but-fixed-shape [`RawRow`].
//!
//! The parser never throws on bad numeric text. Coercion returns an explicit
//! [`CellValue`] sum type so the validator can report the failure with row
//! context, and NaN never flows through the pipeline.

use csv::StringRecord;

use super::header::HeaderMap;

/// Numeric coercion result for one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    /// Non-numeric content, kept verbatim for diagnostics.
    Invalid(String),
}

impl CellValue {
    /// Coerce a raw cell. Empty cells are `None` (missing), everything else
    /// is either a finite number or `Invalid`.
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.is_empty() {
            return None;
        }
        match t.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(CellValue::Number(n)),
            _ => Some(CellValue::Invalid(t.to_string())),
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Invalid(_) => None,
        }
    }
}

/// One data line keyed by canonical field, before validation.
///
/// `None` means the column was absent or empty on that line. Created per
/// input line, consumed immediately by the validator, then discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub date: Option<String>,
    pub mrr: Option<CellValue>,
    pub users: Option<CellValue>,
    pub churn: Option<CellValue>,
    pub new_users: Option<CellValue>,
    pub revenue: Option<CellValue>,
}

/// Extract a [`RawRow`] from one CSV record using the header mapping.
/// Pure per-line transform; no side effects.
pub fn extract_row(headers: &HeaderMap, rec: &StringRecord) -> RawRow {
    let cell = |key: &str| headers.column(key).and_then(|i| rec.get(i));

    RawRow {
        date: cell("date")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        mrr: cell("mrr").and_then(CellValue::parse),
        users: cell("users").and_then(CellValue::parse),
        churn: cell("churn").and_then(CellValue::parse),
        new_users: cell("new_users").and_then(CellValue::parse),
        revenue: cell("revenue").and_then(CellValue::parse),
    }
}
