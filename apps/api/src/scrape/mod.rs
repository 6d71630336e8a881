//! Scrape Client — the single point of entry for all scraping-provider calls.
//!
//! Wraps the provider's `/v1/extract` endpoint: given target job-board or
//! salary-research URLs plus an extraction prompt and schema, the provider
//! returns structured JSON. This module owns the parse-then-validate boundary
//! that converts the untyped payload into `Listing` / `TrendData` — nothing
//! loosely-typed crosses into the pipeline.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::listing::{Listing, TrendData};
use crate::models::search::{slugify, SearchParams};

pub mod prompts;

const SERVICE: &str = "scraping provider";

/// Trend categories the UI offers and `fetch_trends` accepts.
/// Anything outside this list is a validation error, not a scrape attempt.
pub const TREND_CATEGORIES: [&str; 10] = [
    "Information Technology",
    "Software Development",
    "Data Science",
    "Marketing",
    "Finance",
    "Healthcare",
    "Education",
    "Engineering",
    "Sales",
    "Human Resources",
];

pub fn is_recognized_category(category: &str) -> bool {
    TREND_CATEGORIES.contains(&category)
}

/// Source of listings and trend data. The pipeline depends on this trait, not
/// on the concrete client, so tests can run against canned sources.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self, params: &SearchParams) -> Result<Vec<Listing>, AppError>;
    async fn fetch_trends(&self, category: &str) -> Result<TrendData, AppError>;
}

/// Production scraping-provider client. Stateless between calls.
#[derive(Clone)]
pub struct ScrapeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ScrapeClient {
    pub fn new(api_key: String, base_url: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url,
        }
    }

    /// Issues one extract call and returns the envelope's `data` payload.
    async fn extract(&self, urls: Vec<String>, prompt: String, schema: Value) -> Result<Value, AppError> {
        let request_body = ExtractRequest {
            urls,
            prompt,
            schema,
        };

        let response = self
            .client
            .post(format!("{}/v1/extract", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::from_transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_status(SERVICE, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_transport(SERVICE, e))?;

        let envelope: ExtractEnvelope =
            serde_json::from_str(&body).map_err(|e| AppError::MalformedResponse {
                service: SERVICE,
                message: format!("undecodable extract envelope: {e}"),
            })?;

        if !envelope.success {
            return Err(AppError::UpstreamUnavailable {
                service: SERVICE,
                message: format!(
                    "extract reported failure (status: {})",
                    envelope.status.as_deref().unwrap_or("unknown")
                ),
            });
        }

        Ok(envelope.data)
    }
}

#[async_trait]
impl ListingSource for ScrapeClient {
    async fn fetch_listings(&self, params: &SearchParams) -> Result<Vec<Listing>, AppError> {
        if params.role.trim().is_empty() {
            return Err(AppError::Validation("role cannot be empty".to_string()));
        }
        if params.location.trim().is_empty() {
            return Err(AppError::Validation("location cannot be empty".to_string()));
        }

        let urls = listing_urls(params);
        let prompt = prompts::listing_extract_prompt(params);

        debug!("Extracting listings from {} job boards", urls.len());
        let data = self.extract(urls, prompt, prompts::listings_schema()).await?;

        let listings = listings_from_value(&data)?;
        debug!("Scrape returned {} usable listings", listings.len());
        Ok(listings)
    }

    async fn fetch_trends(&self, category: &str) -> Result<TrendData, AppError> {
        if !is_recognized_category(category) {
            return Err(AppError::Validation(format!(
                "unrecognized trend category '{category}'"
            )));
        }

        let urls = trend_urls(category);
        let prompt = prompts::trend_extract_prompt(category);

        let data = self.extract(urls, prompt, prompts::trend_schema()).await?;
        trend_from_value(category, &data)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types and the parse-then-validate boundary
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ExtractRequest {
    urls: Vec<String>,
    prompt: String,
    schema: Value,
}

/// Provider response envelope. `data` stays untyped until validated below.
#[derive(Debug, Deserialize)]
struct ExtractEnvelope {
    success: bool,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct JobPostingsPayload {
    #[serde(default)]
    job_postings: Vec<JobPostingPayload>,
}

#[derive(Debug, Deserialize)]
struct JobPostingPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    raw_text: Option<String>,
    #[serde(default)]
    experience: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrendEnvelopePayload {
    industry_trend: TrendPayload,
}

#[derive(Debug, Deserialize)]
struct TrendPayload {
    #[serde(default)]
    salary_range: Option<String>,
    #[serde(default)]
    demand_level: Option<String>,
    #[serde(default)]
    top_skills: Vec<String>,
    #[serde(default)]
    growth_rate: Option<f64>,
}

/// Converts the extract payload into validated listings.
///
/// A payload that does not match the expected shape at all is a
/// `MalformedResponse`; an individual posting without a URL is salvaged by
/// dropping it with a warning — the URL is a listing's only identity.
pub fn listings_from_value(data: &Value) -> Result<Vec<Listing>, AppError> {
    let payload: JobPostingsPayload =
        serde_json::from_value(data.clone()).map_err(|e| AppError::MalformedResponse {
            service: SERVICE,
            message: format!("job postings payload: {e}"),
        })?;

    let mut listings = Vec::with_capacity(payload.job_postings.len());
    for posting in payload.job_postings {
        let url = posting.url.unwrap_or_default();
        if url.trim().is_empty() {
            warn!("Dropping scraped posting without a url");
            continue;
        }
        listings.push(Listing {
            title: posting.title.unwrap_or_default(),
            company: posting.company.unwrap_or_default(),
            location: posting.location.unwrap_or_default(),
            url,
            raw_text: posting.raw_text.unwrap_or_default(),
            experience: posting.experience,
        });
    }
    Ok(listings)
}

/// Converts the extract payload into validated trend data for `category`.
pub fn trend_from_value(category: &str, data: &Value) -> Result<TrendData, AppError> {
    let payload: TrendEnvelopePayload =
        serde_json::from_value(data.clone()).map_err(|e| AppError::MalformedResponse {
            service: SERVICE,
            message: format!("industry trend payload: {e}"),
        })?;

    let trend = payload.industry_trend;
    let salary_range = trend.salary_range.unwrap_or_default();
    let demand_level = trend.demand_level.unwrap_or_default();
    if salary_range.trim().is_empty() || demand_level.trim().is_empty() {
        return Err(AppError::MalformedResponse {
            service: SERVICE,
            message: "industry trend missing salary_range or demand_level".to_string(),
        });
    }

    Ok(TrendData {
        domain: category.to_string(),
        salary_range,
        demand_level,
        top_skills: trend.top_skills,
        growth_rate: trend.growth_rate,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Target URL patterns
// ────────────────────────────────────────────────────────────────────────────

/// Job boards scraped for listings, keyed on the formatted role/location.
fn listing_urls(params: &SearchParams) -> Vec<String> {
    let role = params.formatted_role();
    let location = params.formatted_location();
    vec![
        format!("https://www.naukri.com/{role}-jobs-in-{location}"),
        format!("https://www.indeed.com/jobs?q={role}&l={location}"),
        format!("https://www.monster.com/jobs/search/?q={role}&where={location}"),
    ]
}

/// Salary-research pages scraped for trend data.
fn trend_urls(category: &str) -> Vec<String> {
    let underscored = category.trim().replace(' ', "_");
    let hyphenated = slugify(category, '-');
    vec![
        format!("https://www.payscale.com/research/US/Job={underscored}/Salary"),
        format!(
            "https://www.glassdoor.com/Salaries/{hyphenated}-salary-SRCH_KO0,{}.htm",
            category.len()
        ),
    ]
}
