//! Axum route handlers for the search and trends API.

use std::collections::BTreeSet;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::search::SearchParams;
use crate::pipeline::runner::{PipelineError, SearchReport, TrendReport};
use crate::scrape::TREND_CATEGORIES;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub role: String,
    pub location: String,
    pub experience_years: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendsRequest {
    pub category: String,
}

/// POST /api/v1/search
///
/// Runs the full pipeline. Input constraints (non-empty role/location,
/// recognized category) are enforced at the scrape boundary and surface as a
/// Scraping-stage validation failure.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchReport>, PipelineError> {
    let params = SearchParams {
        role: request.role.trim().to_string(),
        location: request.location.trim().to_string(),
        experience_years: request.experience_years,
        skills: request
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect::<BTreeSet<_>>(),
    };

    let report = state.pipeline.run(params, request.category.trim()).await?;
    Ok(Json(report))
}

/// POST /api/v1/trends
///
/// Standalone market-trend analysis for one recognized category.
pub async fn handle_trends(
    State(state): State<AppState>,
    Json(request): Json<TrendsRequest>,
) -> Result<Json<TrendReport>, PipelineError> {
    let report = state.pipeline.run_trends(request.category.trim()).await?;
    Ok(Json(report))
}

/// GET /api/v1/trend-categories
///
/// The category list the UI's selector offers.
pub async fn handle_trend_categories() -> Json<Value> {
    Json(json!({ "categories": TREND_CATEGORIES }))
}
