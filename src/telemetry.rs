//! Prometheus telemetry for the service itself (request/ingest counters,
//! demo-cache TTL). Named `telemetry` because "metrics" already means the
//! business data in this crate.

use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Telemetry {
    pub handle: PrometheusHandle,
}

impl Telemetry {
    /// Install the Prometheus recorder and publish static gauges.
    /// Call once per process, from the binary entrypoint.
    pub fn init(demo_cache_ttl_ms: u64) -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_gauge!(
            "demo_cache_ttl_ms",
            "Configured TTL of the memoized demo dashboard."
        );
        gauge!("demo_cache_ttl_ms").set(demo_cache_ttl_ms as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
