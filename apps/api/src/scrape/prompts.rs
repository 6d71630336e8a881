//! Extraction prompts and schemas sent to the scraping provider.

use serde_json::{json, Value};

use crate::models::search::SearchParams;

/// Cap on postings requested per extract call — keeps downstream prompt
/// construction well inside the model's context budget before truncation
/// even starts.
pub const MAX_POSTINGS: usize = 10;

/// Extraction prompt for job-board pages.
pub fn listing_extract_prompt(params: &SearchParams) -> String {
    format!(
        "Extract job postings from these job sites.\n\
        Look for jobs that match these criteria:\n\
        - Title: should be related to {role}\n\
        - Location: {location} (include remote jobs if available)\n\
        - Experience: around {years} years\n\
        - Skills: should match at least some of: {skills}\n\
        - Job type: full-time, part-time, contract, temporary, internship\n\
        For each posting extract: title, company, location, experience, url, raw_text.\n\
        MAX {max} postings.",
        role = params.role,
        location = params.location,
        years = params.experience_years,
        skills = params.skills_line(),
        max = MAX_POSTINGS,
    )
}

/// Extraction prompt for salary-research pages.
pub fn trend_extract_prompt(category: &str) -> String {
    format!(
        "Extract aggregated market data for the {category} industry.\n\
        Combine what the pages report into a single summary with:\n\
        - salary_range: typical salary band as printed (e.g. \"$95k - $160k\")\n\
        - demand_level: one of Low, Moderate, High, Very High\n\
        - top_skills: skills in demand, strongest first\n\
        - growth_rate: annual growth as a fraction if stated (e.g. 0.21)"
    )
}

/// Schema for the listings extract call: a `job_postings` array.
pub fn listings_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "job_postings": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "company": { "type": "string" },
                        "location": { "type": "string" },
                        "experience": { "type": "string" },
                        "url": { "type": "string" },
                        "raw_text": { "type": "string" }
                    },
                    "required": ["url"]
                }
            }
        },
        "required": ["job_postings"]
    })
}

/// Schema for the trend extract call: a single aggregate object.
pub fn trend_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "industry_trend": {
                "type": "object",
                "properties": {
                    "salary_range": { "type": "string" },
                    "demand_level": { "type": "string" },
                    "top_skills": { "type": "array", "items": { "type": "string" } },
                    "growth_rate": { "type": "number" }
                },
                "required": ["salary_range", "demand_level"]
            }
        },
        "required": ["industry_trend"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_listing_prompt_mentions_all_criteria() {
        let params = SearchParams {
            role: "Data Scientist".to_string(),
            location: "Remote".to_string(),
            experience_years: 3,
            skills: BTreeSet::from(["Python".to_string(), "SQL".to_string()]),
        };
        let prompt = listing_extract_prompt(&params);
        assert!(prompt.contains("Data Scientist"));
        assert!(prompt.contains("Remote"));
        assert!(prompt.contains("around 3 years"));
        assert!(prompt.contains("Python, SQL"));
        assert!(prompt.contains("MAX 10 postings"));
    }

    #[test]
    fn test_schemas_name_the_fields_the_boundary_validates() {
        let listings = listings_schema();
        assert_eq!(
            listings["properties"]["job_postings"]["items"]["required"][0],
            "url"
        );
        let trend = trend_schema();
        let required = trend["properties"]["industry_trend"]["required"]
            .as_array()
            .unwrap();
        assert!(required.iter().any(|v| v == "salary_range"));
    }
}
