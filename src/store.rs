//! # Stores
//! In-memory per-owner storage for metric records and insight reports.
//!
//! An uploaded batch replaces the owner's entire history (all-or-nothing),
//! and retrieval returns records sorted by date ascending so downstream
//! aggregation can take first/last elements as period boundaries.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::insights::InsightReport;
use crate::record::MetricRecord;

#[derive(Debug, Default)]
pub struct MetricStore {
    inner: RwLock<HashMap<String, Vec<MetricRecord>>>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the owner's entire history with a freshly validated batch.
    pub fn replace(&self, owner_id: &str, records: Vec<MetricRecord>) {
        let mut map = self.inner.write().expect("metric store lock poisoned");
        map.insert(owner_id.to_string(), records);
    }

    /// All records for an owner, sorted by date ascending.
    pub fn fetch(&self, owner_id: &str) -> Vec<MetricRecord> {
        let map = self.inner.read().expect("metric store lock poisoned");
        let mut records = map.get(owner_id).cloned().unwrap_or_default();
        records.sort_by_key(|r| r.date);
        records
    }

    pub fn count(&self, owner_id: &str) -> usize {
        let map = self.inner.read().expect("metric store lock poisoned");
        map.get(owner_id).map_or(0, Vec::len)
    }

    /// Remove the owner's history. Returns whether anything was stored.
    pub fn delete(&self, owner_id: &str) -> bool {
        let mut map = self.inner.write().expect("metric store lock poisoned");
        map.remove(owner_id).is_some()
    }
}

#[derive(Debug, Default)]
pub struct InsightStore {
    inner: RwLock<HashMap<String, InsightReport>>,
}

impl InsightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, owner_id: &str, report: InsightReport) {
        let mut map = self.inner.write().expect("insight store lock poisoned");
        map.insert(owner_id.to_string(), report);
    }

    pub fn fetch(&self, owner_id: &str) -> Option<InsightReport> {
        let map = self.inner.read().expect("insight store lock poisoned");
        map.get(owner_id).cloned()
    }

    pub fn delete(&self, owner_id: &str) -> bool {
        let mut map = self.inner.write().expect("insight store lock poisoned");
        map.remove(owner_id).is_some()
    }
}
