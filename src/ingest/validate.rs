// src/ingest/validate.rs
//! Per-row business validation.
//!
//! Checks run in a fixed order and the first failure wins: presence of all
//! six fields, date validity, non-negativity, churn bound. An `Invalid`
//! numeric cell counts as missing/unparseable, never as a silent zero.

use chrono::{DateTime, NaiveDate};

use super::error::IngestError;
use super::rows::{CellValue, RawRow};

/// A row that passed every check, before owner/timestamp stamping.
///
/// Numerics stay `f64` here; the assembler truncates the two count fields
/// toward zero when building the final record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
    pub date: NaiveDate,
    pub mrr: f64,
    pub users: f64,
    pub churn: f64,
    pub new_users: f64,
    pub revenue: f64,
}

/// Date formats accepted for the reporting period, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse the raw date text into a calendar date.
/// Accepts the plain-date formats above plus an RFC 3339 timestamp, whose
/// date part is taken.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    DateTime::parse_from_rfc3339(t).ok().map(|dt| dt.date_naive())
}

fn numeric(
    field: &'static str,
    cell: &Option<CellValue>,
    row: usize,
) -> Result<f64, IngestError> {
    match cell.as_ref().and_then(CellValue::number) {
        Some(n) => Ok(n),
        None => Err(IngestError::MissingField { row, field }),
    }
}

/// Validate one row. `row` is the 1-based CSV line number (header = row 1).
pub fn validate_row(raw: &RawRow, row: usize) -> Result<ValidRow, IngestError> {
    // 1) Presence. Unparseable numerics fail here too.
    let date_raw = raw
        .date
        .as_deref()
        .ok_or(IngestError::MissingField { row, field: "date" })?;
    let mrr = numeric("mrr", &raw.mrr, row)?;
    let users = numeric("users", &raw.users, row)?;
    let churn = numeric("churn", &raw.churn, row)?;
    let new_users = numeric("new_users", &raw.new_users, row)?;
    let revenue = numeric("revenue", &raw.revenue, row)?;

    // 2) Date validity.
    let date = parse_date(date_raw).ok_or(IngestError::InvalidDate { row })?;

    // 3) Non-negativity.
    for (field, value) in [
        ("mrr", mrr),
        ("users", users),
        ("churn", churn),
        ("new_users", new_users),
        ("revenue", revenue),
    ] {
        if value < 0.0 {
            return Err(IngestError::NegativeValue { row, field });
        }
    }

    // 4) Churn bound.
    if churn > 100.0 {
        return Err(IngestError::ChurnBound { row });
    }

    Ok(ValidRow {
        date,
        mrr,
        users,
        churn,
        new_users,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> RawRow {
        RawRow {
            date: Some("2024-01-01".to_string()),
            mrr: CellValue::parse("5000"),
            users: CellValue::parse("120"),
            churn: CellValue::parse("3.2"),
            new_users: CellValue::parse("15"),
            revenue: CellValue::parse("5500"),
        }
    }

    #[test]
    fn valid_row_passes() {
        let v = validate_row(&full_row(), 2).unwrap();
        assert_eq!(v.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(v.users, 120.0);
    }

    #[test]
    fn presence_beats_date_validity() {
        // both the date and mrr are broken; presence is checked first
        let mut raw = full_row();
        raw.date = Some("not-a-date".to_string());
        raw.mrr = None;
        match validate_row(&raw, 4).unwrap_err() {
            IngestError::MissingField { row: 4, field: "mrr" } => {}
            other => panic!("expected MissingField(mrr), got {other:?}"),
        }
    }

    #[test]
    fn unparseable_numeric_reports_the_field() {
        let mut raw = full_row();
        raw.churn = CellValue::parse("n/a");
        match validate_row(&raw, 3).unwrap_err() {
            IngestError::MissingField { row: 3, field: "churn" } => {}
            other => panic!("expected MissingField(churn), got {other:?}"),
        }
    }

    #[test]
    fn invalid_date_after_presence() {
        let mut raw = full_row();
        raw.date = Some("2024-13-45".to_string());
        assert!(matches!(
            validate_row(&raw, 2).unwrap_err(),
            IngestError::InvalidDate { row: 2 }
        ));
    }

    #[test]
    fn boundary_values() {
        let mut raw = full_row();
        raw.churn = CellValue::parse("100");
        assert!(validate_row(&raw, 2).is_ok(), "churn = 100 is inside the bound");

        raw.churn = CellValue::parse("100.01");
        assert!(matches!(
            validate_row(&raw, 2).unwrap_err(),
            IngestError::ChurnBound { row: 2 }
        ));

        let mut raw = full_row();
        raw.mrr = CellValue::parse("0");
        assert!(validate_row(&raw, 2).is_ok(), "mrr = 0 is allowed");

        raw.mrr = CellValue::parse("-0.01");
        assert!(matches!(
            validate_row(&raw, 2).unwrap_err(),
            IngestError::NegativeValue { row: 2, field: "mrr" }
        ));
    }

    #[test]
    fn accepted_date_formats() {
        assert_eq!(
            parse_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("2024/01/05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("01/05/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("2024-01-05T12:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_date("yesterday"), None);
    }
}
