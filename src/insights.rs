//! # AI Insights
//! Insight generation over an owner's metric history: a provider abstraction,
//! a Gemini-backed client, and a deterministic computed fallback used when the
//! remote call is disabled or fails.
//!
//! The prompt compares the two most recent periods; fewer than 2 data points
//! yields a single "Insufficient Data" insight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::MetricRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Info,
}

/// One actionable insight as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Insight {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

/// A stored set of insights for one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub insights: Vec<Insight>,
    pub generated_at: DateTime<Utc>,
}

impl InsightReport {
    pub fn now(insights: Vec<Insight>) -> Self {
        Self {
            insights,
            generated_at: Utc::now(),
        }
    }
}

/// Generator abstraction so handlers and tests don't care which backend runs.
#[async_trait::async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, metrics: &[MetricRecord]) -> Vec<Insight>;
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Pick a backend: Gemini when a key is configured, computed insights otherwise.
pub fn build_generator(api_key: &str, model: &str) -> Arc<dyn InsightGenerator> {
    if api_key.trim().is_empty() {
        tracing::warn!("GEMINI_API_KEY not set; insights fall back to computed mode");
        Arc::new(ComputedGenerator)
    } else {
        Arc::new(GeminiGenerator::new(api_key, model))
    }
}

// ------------------------------------------------------------
// Gemini provider
// ------------------------------------------------------------

/// Calls the Gemini generateContent endpoint and parses the JSON the model
/// was instructed to return. Any failure along the way degrades to the
/// computed fallback; insight generation never fails an upload.
pub struct GeminiGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("metricdeck/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn fetch_remote(&self, prompt: &str) -> Option<Vec<Insight>> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }
        #[derive(Deserialize)]
        struct Content {
            parts: Vec<Part>,
        }
        #[derive(Deserialize)]
        struct Part {
            text: String,
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 1000 }
        });

        let resp = self.http.post(&url).json(&body).send().await.ok()?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "gemini call failed");
            return None;
        }
        let parsed: GenerateResponse = resp.json().await.ok()?;
        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())?;
        parse_model_output(text)
    }
}

#[async_trait::async_trait]
impl InsightGenerator for GeminiGenerator {
    async fn generate(&self, metrics: &[MetricRecord]) -> Vec<Insight> {
        let Some((previous, latest)) = last_two(metrics) else {
            return insufficient_data();
        };
        let prompt = build_prompt(latest, previous);
        match self.fetch_remote(&prompt).await {
            Some(insights) if !insights.is_empty() => insights,
            _ => fallback_insights(latest, previous),
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Deterministic backend: always the computed fallback. Used when no API key
/// is configured, and in tests.
pub struct ComputedGenerator;

#[async_trait::async_trait]
impl InsightGenerator for ComputedGenerator {
    async fn generate(&self, metrics: &[MetricRecord]) -> Vec<Insight> {
        match last_two(metrics) {
            Some((previous, latest)) => fallback_insights(latest, previous),
            None => insufficient_data(),
        }
    }

    fn name(&self) -> &'static str {
        "computed"
    }
}

// ------------------------------------------------------------
// Prompt + parsing
// ------------------------------------------------------------

fn last_two(metrics: &[MetricRecord]) -> Option<(&MetricRecord, &MetricRecord)> {
    if metrics.len() < 2 {
        return None;
    }
    Some((&metrics[metrics.len() - 2], &metrics[metrics.len() - 1]))
}

/// Build the analyst prompt from the two most recent periods.
pub fn build_prompt(latest: &MetricRecord, previous: &MetricRecord) -> String {
    format!(
        "You are a SaaS metrics analyst. Analyze these metrics and provide exactly 3 actionable insights in JSON format.\n\n\
         Current Month:\n\
         - MRR: ${:.2}\n\
         - Users: {}\n\
         - Churn: {:.2}%\n\
         - New Users: {}\n\
         - Revenue: ${:.2}\n\n\
         Previous Month:\n\
         - MRR: ${:.2}\n\
         - Users: {}\n\
         - Churn: {:.2}%\n\
         - New Users: {}\n\
         - Revenue: ${:.2}\n\n\
         Respond ONLY with this JSON structure (no markdown, no explanation):\n\
         {{\"insights\": [{{\"title\": \"...\", \"description\": \"...\", \"severity\": \"success\"}}]}}",
        latest.mrr,
        latest.users,
        latest.churn,
        latest.new_users,
        latest.revenue,
        previous.mrr,
        previous.users,
        previous.churn,
        previous.new_users,
        previous.revenue,
    )
}

/// Parse the model's reply: strip markdown code fences, then decode the
/// `{"insights": [...]}` payload. `None` on any mismatch.
pub fn parse_model_output(text: &str) -> Option<Vec<Insight>> {
    #[derive(Deserialize)]
    struct ParsedInsights {
        insights: Vec<Insight>,
    }

    static RE_FENCES: OnceCell<Regex> = OnceCell::new();
    let re = RE_FENCES.get_or_init(|| Regex::new(r"```json\n?|\n?```").unwrap());
    let clean = re.replace_all(text, "");
    let parsed: ParsedInsights = serde_json::from_str(clean.trim()).ok()?;
    Some(parsed.insights)
}

// ------------------------------------------------------------
// Computed fallback
// ------------------------------------------------------------

fn insufficient_data() -> Vec<Insight> {
    vec![Insight::new(
        "Insufficient Data",
        "Upload more data points to generate meaningful insights.",
        Severity::Info,
    )]
}

/// Month-over-month percentage change; zero when the base period is zero.
fn pct_change(previous: f64, latest: f64) -> f64 {
    if previous.abs() < f64::EPSILON {
        return 0.0;
    }
    (latest - previous) / previous * 100.0
}

/// Derive three insights directly from the last two periods.
pub fn fallback_insights(latest: &MetricRecord, previous: &MetricRecord) -> Vec<Insight> {
    let mrr_growth = pct_change(previous.mrr, latest.mrr);
    let user_growth = pct_change(previous.users as f64, latest.users as f64);
    let churn_change = latest.churn - previous.churn;

    let mrr_insight = if mrr_growth > 0.0 {
        Insight::new(
            "MRR Growth Detected",
            format!(
                "Your MRR increased by {:.1}% this month. Continue scaling your acquisition channels.",
                mrr_growth.abs()
            ),
            Severity::Success,
        )
    } else {
        Insight::new(
            "MRR Decline",
            format!(
                "Your MRR decreased by {:.1}% this month. Investigate retention issues and consider pricing adjustments.",
                mrr_growth.abs()
            ),
            Severity::Warning,
        )
    };

    let user_insight = Insight::new(
        "User Base Update",
        format!(
            "User growth is at {:.1}% month-over-month with {} new sign-ups. Focus on onboarding optimization to convert these users faster.",
            user_growth, latest.new_users
        ),
        Severity::Info,
    );

    let churn_insight = if churn_change > 0.0 {
        Insight::new(
            "Churn Increased",
            format!(
                "Churn increased by {:.1}%. Consider implementing win-back campaigns and investigating user feedback.",
                churn_change.abs()
            ),
            Severity::Warning,
        )
    } else {
        Insight::new(
            "Churn Improved",
            format!(
                "Churn decreased by {:.1}%. Your retention efforts are working. Document what's driving success.",
                churn_change.abs()
            ),
            Severity::Success,
        )
    };

    vec![mrr_insight, user_insight, churn_insight]
}
