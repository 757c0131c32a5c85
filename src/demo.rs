//! # Demo Data
//! Synthetic metric history for the client-facing demo mode.
//!
//! Records are schema-identical to uploaded ones but never pass through the
//! ingest pipeline. The aggregated demo view is memoized in an explicit
//! process-wide single-slot cache with TTL invalidation.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use rand::Rng;

use crate::aggregate::{self, DashboardView, Mode};
use crate::record::MetricRecord;

pub const DEMO_OWNER: &str = "demo";
const DEMO_MONTHS: usize = 6;

/// Generate a 6-month synthetic history ending in the current month.
/// Values follow jittered growth curves; every record satisfies the same
/// invariants the validator enforces on uploads.
pub fn generate_demo_records() -> Vec<MetricRecord> {
    let mut rng = rand::rng();
    let uploaded_at = Utc::now();
    let today = uploaded_at.date_naive();

    (0..DEMO_MONTHS)
        .map(|i| {
            let months_back = (DEMO_MONTHS - 1 - i) as i32;
            let growth = i as f64;
            MetricRecord {
                owner_id: DEMO_OWNER.to_string(),
                date: first_of_month_back(today, months_back),
                mrr: 5_000.0 + growth * 800.0 + rng.random_range(0.0..500.0),
                users: 120 + (i as u64) * 15 + rng.random_range(0..10),
                churn: 3.0 + rng.random_range(0.0..2.0),
                new_users: 15 + rng.random_range(0..10),
                revenue: 5_500.0 + growth * 900.0 + rng.random_range(0.0..600.0),
                uploaded_at,
            }
        })
        .collect()
}

fn first_of_month_back(today: NaiveDate, months_back: i32) -> NaiveDate {
    let months = today.year() * 12 + today.month0() as i32 - months_back;
    let (year, month0) = (months.div_euclid(12), months.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, (month0 + 1) as u32, 1).expect("valid first-of-month")
}

struct CacheSlot {
    built_at: Instant,
    view: DashboardView,
}

static DEMO_CACHE: Lazy<Mutex<Option<CacheSlot>>> = Lazy::new(|| Mutex::new(None));

/// Memoized demo dashboard. The slot is rebuilt once `ttl` has elapsed;
/// within the TTL every caller sees the identical cached view.
pub fn demo_dashboard(ttl: Duration) -> DashboardView {
    let mut slot = DEMO_CACHE.lock().expect("demo cache lock poisoned");
    if let Some(cached) = slot.as_ref() {
        if cached.built_at.elapsed() < ttl {
            return cached.view.clone();
        }
    }

    let records = generate_demo_records();
    let view =
        aggregate::build_dashboard(Mode::Demo, &records).expect("demo batch is never empty");
    *slot = Some(CacheSlot {
        built_at: Instant::now(),
        view: view.clone(),
    });
    tracing::debug!(months = DEMO_MONTHS, "demo dashboard rebuilt");
    view
}

/// Drop the memoized view so the next request rebuilds it.
pub fn invalidate_demo_cache() {
    *DEMO_CACHE.lock().expect("demo cache lock poisoned") = None;
}
