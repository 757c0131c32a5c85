use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use tower_http::cors::CorsLayer;

use crate::aggregate::DashboardView;
use crate::config::Config;
use crate::demo;
use crate::ingest;
use crate::insights::{build_generator, Insight, InsightGenerator, InsightReport};
use crate::record::MetricRecord;
use crate::store::{InsightStore, MetricStore};

/// Owner identity arrives from the auth layer as an opaque header value.
const OWNER_HEADER: &str = "x-owner-id";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub metrics: Arc<MetricStore>,
    pub insights: Arc<InsightStore>,
    pub generator: Arc<dyn InsightGenerator>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let generator = build_generator(&config.gemini_api_key, &config.gemini_model);
        Self {
            config,
            metrics: Arc::new(MetricStore::new()),
            insights: Arc::new(InsightStore::new()),
            generator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/serverstatus", get(server_status))
        .route("/api/v1/metrics", get(get_metrics))
        .route("/api/v1/metrics/upload", post(upload_metrics))
        .route("/api/v1/del/metrics", delete(delete_metrics))
        .route("/api/v1/insights", get(get_insights))
        .route("/api/v1/insights/regenerate", post(regenerate_insights))
        .route("/api/v1/demo/dashboard", get(demo_dashboard))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---- response shapes ----

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(serde::Serialize)]
struct MessageBody {
    message: String,
}

#[derive(serde::Serialize)]
struct MetricsPayload {
    metrics: Vec<MetricRecord>,
    insights: Vec<Insight>,
}

#[derive(serde::Serialize)]
struct MetricsEnvelope {
    message: String,
    count: usize,
    payload: MetricsPayload,
}

#[derive(serde::Serialize)]
struct HealthBody {
    status: &'static str,
    timestamp: DateTime<Utc>,
    uptime_secs: u64,
}

#[derive(serde::Serialize)]
struct ServerStatusBody {
    status: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn err(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn owner_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| err(StatusCode::UNAUTHORIZED, "Missing owner identity"))
}

// ---- handlers ----

async fn health() -> Json<HealthBody> {
    static START: Lazy<Instant> = Lazy::new(Instant::now);
    Json(HealthBody {
        status: "ok",
        timestamp: Utc::now(),
        uptime_secs: START.elapsed().as_secs(),
    })
}

async fn server_status() -> Json<ServerStatusBody> {
    Json(ServerStatusBody {
        status: true,
        message: "Server is running",
        timestamp: Utc::now(),
    })
}

async fn upload_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<MetricsEnvelope>, ApiError> {
    let owner = owner_id(&headers)?;

    let mut file_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| err(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| err(StatusCode::BAD_REQUEST, "Failed to read uploaded file"))?;
            file_bytes = Some(bytes);
            break;
        }
    }
    let Some(bytes) = file_bytes else {
        return Err(err(StatusCode::BAD_REQUEST, "No file uploaded"));
    };

    let text = String::from_utf8_lossy(&bytes);
    let records = ingest::parse_metrics_csv(&text, &owner)
        .map_err(|e| err(StatusCode::BAD_REQUEST, e.to_string()))?;

    // All-or-nothing: the validated batch replaces the owner's history.
    state.metrics.replace(&owner, records.clone());

    let insights = state.generator.generate(&records).await;
    let report = InsightReport::now(insights.clone());
    state.insights.upsert(&owner, report);

    tracing::info!(owner = %owner, rows = records.len(), "metrics uploaded");
    Ok(Json(MetricsEnvelope {
        message: "Metrics uploaded successfully".to_string(),
        count: records.len(),
        payload: MetricsPayload {
            metrics: records,
            insights,
        },
    }))
}

async fn get_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MetricsEnvelope>, ApiError> {
    let owner = owner_id(&headers)?;

    let records = state.metrics.fetch(&owner);
    let insights = state
        .insights
        .fetch(&owner)
        .map(|r| r.insights)
        .unwrap_or_default();

    Ok(Json(MetricsEnvelope {
        message: "Metrics retrieved successfully".to_string(),
        count: records.len(),
        payload: MetricsPayload {
            metrics: records,
            insights,
        },
    }))
}

async fn delete_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageBody>, ApiError> {
    let owner = owner_id(&headers)?;

    state.metrics.delete(&owner);
    state.insights.delete(&owner);

    Ok(Json(MessageBody {
        message: "All metrics deleted successfully".to_string(),
    }))
}

async fn get_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InsightReport>, ApiError> {
    let owner = owner_id(&headers)?;

    state.insights.fetch(&owner).map(Json).ok_or_else(|| {
        err(
            StatusCode::NOT_FOUND,
            "No insights found. Upload metrics first.",
        )
    })
}

async fn regenerate_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InsightReport>, ApiError> {
    let owner = owner_id(&headers)?;

    let records = state.metrics.fetch(&owner);
    if records.len() < 2 {
        return Err(err(
            StatusCode::BAD_REQUEST,
            "Need at least 2 data points to generate insights",
        ));
    }

    let insights = state.generator.generate(&records).await;
    let report = InsightReport::now(insights);
    state.insights.upsert(&owner, report.clone());

    Ok(Json(report))
}

async fn demo_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    let ttl = Duration::from_millis(state.config.demo_cache_ttl_ms);
    Json(demo::demo_dashboard(ttl))
}
