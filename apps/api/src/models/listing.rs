//! Scraped market entities — job listings and aggregated trend data.
//!
//! Both are produced exclusively by the scrape module's parse-then-validate
//! boundary; nothing else in the crate constructs them from external input.

use serde::{Deserialize, Serialize};

/// A single scraped job posting. Ephemeral — held only for the request's
/// duration; identity is the `url` (guaranteed non-empty by the scrape
/// boundary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub raw_text: String,
    /// Experience requirement as stated by the posting, when the provider
    /// extracted one ("3-5 years", "Senior").
    pub experience: Option<String>,
}

impl Listing {
    /// Text used when matching a ranked completion section back to a listing.
    pub fn match_key(&self) -> String {
        format!("{} {}", self.title, self.company)
    }
}

/// Aggregated market data for one domain/category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendData {
    pub domain: String,
    pub salary_range: String,
    pub demand_level: String,
    /// Skills ordered by demand, strongest first.
    pub top_skills: Vec<String>,
    pub growth_rate: Option<f64>,
}
