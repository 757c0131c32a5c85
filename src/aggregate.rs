//! # Dashboard Aggregation
//! Pure derivation of a [`DashboardView`] from a date-sorted record slice.
//! The period boundaries are the first and last records, so callers must
//! hand in store-order (date-ascending) data.

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::MetricRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Real,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_revenue: f64,
    pub total_users: u64,
    pub active_users: u64,
    pub latest_mrr: f64,
    pub latest_churn: f64,
    /// Display heuristic carried over from the dashboard: 100 - churn * 10.
    pub customer_retention: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub mrr: f64,
    pub users: u64,
    pub churn: f64,
    pub new_users: u64,
    pub revenue: f64,
}

/// Period summaries and per-period series for one owner (or the demo set).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub mode: Mode,
    pub time_period: TimePeriod,
    pub summary: SummaryMetrics,
    pub series: Vec<SeriesPoint>,
}

/// Share of the latest user count assumed active, by mode.
fn active_factor(mode: Mode) -> f64 {
    match mode {
        Mode::Real => 0.8,
        Mode::Demo => 0.7,
    }
}

/// Build the view. `None` when there are no records to summarize.
pub fn build_dashboard(mode: Mode, records: &[MetricRecord]) -> Option<DashboardView> {
    let first = records.first()?;
    let latest = records.last()?;

    let summary = SummaryMetrics {
        total_revenue: records.iter().map(|r| r.revenue).sum(),
        total_users: latest.users,
        active_users: (latest.users as f64 * active_factor(mode)).floor() as u64,
        latest_mrr: latest.mrr,
        latest_churn: latest.churn,
        customer_retention: 100.0 - latest.churn * 10.0,
    };

    let series = records
        .iter()
        .map(|r| SeriesPoint {
            date: r.date,
            mrr: r.mrr,
            users: r.users,
            churn: r.churn,
            new_users: r.new_users,
            revenue: r.revenue,
        })
        .collect();

    Some(DashboardView {
        mode,
        time_period: TimePeriod {
            start_date: first.date,
            end_date: latest.date,
        },
        summary,
        series,
    })
}
