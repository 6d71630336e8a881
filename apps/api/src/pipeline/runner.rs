//! Pipeline — sequential orchestration of one job-search run.
//!
//! Flow: fetch listings + trends → build prompt → infer → parse → report.
//! Stages run strictly in order; each stage's output is the next stage's
//! sole input. Every executed stage emits one TraceEvent, best-effort.
//!
//! An unparsable completion degrades the run (raw text fallback) instead of
//! failing it — every other stage error surfaces as `PipelineError` with the
//! failing stage attached.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::inference::{self, CompletionBackend};
use crate::models::listing::TrendData;
use crate::models::recommendation::Recommendation;
use crate::models::search::SearchParams;
use crate::models::trace::TraceEvent;
use crate::pipeline::parser::{self, MarkerConfig};
use crate::pipeline::prompt_builder;
use crate::scrape::ListingSource;
use crate::trace::{record_best_effort, TraceSink};

// ────────────────────────────────────────────────────────────────────────────
// Stages and errors
// ────────────────────────────────────────────────────────────────────────────

/// Active pipeline stages, in execution order. A run that returns a report
/// finished in `Done`; a run that returns `PipelineError` ended in `Errored`
/// at the recorded stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Scraping,
    Prompting,
    Inferring,
    Parsing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scraping => "Scraping",
            Stage::Prompting => "Prompting",
            Stage::Inferring => "Inferring",
            Stage::Parsing => "Parsing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline run that entered `Errored`: the failing stage plus the
/// underlying error kind.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.source.status();
        let body = Json(json!({
            "error": {
                "code": self.source.kind(),
                "stage": self.stage.as_str(),
                "message": self.source.user_message()
            }
        }));
        (status, body).into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reports
// ────────────────────────────────────────────────────────────────────────────

/// Output of a completed job-search run.
///
/// `degraded` marks the unparsable-completion fallback: zero recommendations
/// with the raw model text available for display.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub request_id: Uuid,
    pub recommendations: Vec<Recommendation>,
    pub skills_analysis: Option<String>,
    pub application_tips: Option<String>,
    pub trend: TrendData,
    pub degraded: bool,
    pub raw_completion: Option<String>,
}

/// Output of the standalone trend-analysis operation.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub request_id: Uuid,
    pub category: String,
    pub trend: TrendData,
    pub analysis: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Composes the scrape, inference, and trace collaborators for one request at
/// a time. Stateless across requests; cheap to share behind an `Arc`.
pub struct Pipeline {
    scrape: Arc<dyn ListingSource>,
    inference: Arc<dyn CompletionBackend>,
    tracer: Arc<dyn TraceSink>,
    prompt_char_budget: usize,
    markers: MarkerConfig,
}

impl Pipeline {
    pub fn new(
        scrape: Arc<dyn ListingSource>,
        inference: Arc<dyn CompletionBackend>,
        tracer: Arc<dyn TraceSink>,
        prompt_char_budget: usize,
        markers: MarkerConfig,
    ) -> Self {
        Self {
            scrape,
            inference,
            tracer,
            prompt_char_budget,
            markers,
        }
    }

    /// Runs one stage: times it, emits its TraceEvent, and tags any failure
    /// with the stage name. Trace delivery is best-effort and cannot fail
    /// the stage.
    async fn stage<T>(
        &self,
        request_id: Uuid,
        stage: Stage,
        work: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, PipelineError> {
        let started = Utc::now();
        let result = work.await;

        let event = TraceEvent::new(
            request_id,
            stage.as_str(),
            started,
            result.is_ok(),
            result.as_ref().err().map(|e| e.to_string()),
        );
        record_best_effort(self.tracer.as_ref(), event).await;

        result.map_err(|source| {
            warn!("{stage} stage failed: {source}");
            PipelineError { stage, source }
        })
    }

    /// Runs the full job-search pipeline for one request.
    pub async fn run(
        &self,
        params: SearchParams,
        category: &str,
    ) -> Result<SearchReport, PipelineError> {
        let request_id = Uuid::new_v4();
        info!(%request_id, role = %params.role, location = %params.location, "Starting job search");

        // Stage 1: scrape listings and market trends.
        let (listings, trend) = self
            .stage(request_id, Stage::Scraping, async {
                let listings = self.scrape.fetch_listings(&params).await?;
                let trend = self.scrape.fetch_trends(category).await?;
                Ok((listings, trend))
            })
            .await?;
        info!(%request_id, "Scraped {} listings", listings.len());

        // Stage 2: build the analysis prompt. Pure — traced for latency
        // symmetry with the other stages.
        let prompt = self
            .stage(request_id, Stage::Prompting, async {
                Ok(prompt_builder::build(
                    &params,
                    &listings,
                    &trend,
                    self.prompt_char_budget,
                ))
            })
            .await?;

        // Stage 3: hosted-model inference (sole retry site, see inference::infer).
        let completion = self
            .stage(
                request_id,
                Stage::Inferring,
                inference::infer(self.inference.as_ref(), &prompt),
            )
            .await?;

        // Stage 4: parse. An unparsable completion degrades instead of erroring;
        // its TraceEvent still records the failure.
        let started = Utc::now();
        match parser::parse(&completion, &listings, &self.markers) {
            Ok(analysis) => {
                let event =
                    TraceEvent::new(request_id, Stage::Parsing.as_str(), started, true, None);
                record_best_effort(self.tracer.as_ref(), event).await;
                info!(
                    %request_id,
                    "Search done: {} recommendations",
                    analysis.recommendations.len()
                );
                Ok(SearchReport {
                    request_id,
                    recommendations: analysis.recommendations,
                    skills_analysis: analysis.skills_analysis,
                    application_tips: analysis.application_tips,
                    trend,
                    degraded: false,
                    raw_completion: None,
                })
            }
            Err(err @ AppError::UnparsableCompletion) => {
                let event = TraceEvent::new(
                    request_id,
                    Stage::Parsing.as_str(),
                    started,
                    false,
                    Some(err.to_string()),
                );
                record_best_effort(self.tracer.as_ref(), event).await;
                warn!(%request_id, "Completion had no ranked sections — returning raw fallback");
                Ok(SearchReport {
                    request_id,
                    recommendations: Vec::new(),
                    skills_analysis: None,
                    application_tips: None,
                    trend,
                    degraded: true,
                    raw_completion: Some(completion),
                })
            }
            Err(source) => {
                let event = TraceEvent::new(
                    request_id,
                    Stage::Parsing.as_str(),
                    started,
                    false,
                    Some(source.to_string()),
                );
                record_best_effort(self.tracer.as_ref(), event).await;
                Err(PipelineError {
                    stage: Stage::Parsing,
                    source,
                })
            }
        }
    }

    /// Runs the standalone trend-analysis operation: scrape → prompt → infer.
    pub async fn run_trends(&self, category: &str) -> Result<TrendReport, PipelineError> {
        let request_id = Uuid::new_v4();
        info!(%request_id, %category, "Starting trend analysis");

        let trend = self
            .stage(request_id, Stage::Scraping, self.scrape.fetch_trends(category))
            .await?;

        let prompt = self
            .stage(request_id, Stage::Prompting, async {
                Ok(prompt_builder::build_trend_analysis(
                    category,
                    &trend,
                    self.prompt_char_budget,
                ))
            })
            .await?;

        let analysis = self
            .stage(
                request_id,
                Stage::Inferring,
                inference::infer(self.inference.as_ref(), &prompt),
            )
            .await?;

        Ok(TrendReport {
            request_id,
            category: category.to_string(),
            trend,
            analysis,
        })
    }
}
