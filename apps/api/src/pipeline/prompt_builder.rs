//! Prompt Builder — deterministic assembly of the analysis prompt.
//!
//! Pure: same params + listings + trends always yield the same text.
//! Truncation policy: keep the first N listings in given order, drop the
//! remainder, and note the drop count in the prompt. The rendered prompt
//! never exceeds the configured character budget.

use crate::models::listing::{Listing, TrendData};
use crate::models::search::SearchParams;
use crate::pipeline::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, NO_MATCHES_PROMPT_TEMPLATE, TREND_ANALYSIS_PROMPT_TEMPLATE,
};

/// Builds the analysis prompt for one pipeline run.
pub fn build(
    params: &SearchParams,
    listings: &[Listing],
    trends: &TrendData,
    char_budget: usize,
) -> String {
    let trend_block = render_trend_block(trends);

    if listings.is_empty() {
        let prompt = fill_common(NO_MATCHES_PROMPT_TEMPLATE, params, &trend_block);
        return truncate_to_budget(prompt, char_budget);
    }

    let blocks: Vec<String> = listings.iter().map(render_listing_block).collect();

    // Drop listings from the tail until the rendered prompt fits.
    let mut kept = blocks.len();
    loop {
        let listings_block = if kept == 0 {
            "(listing details omitted — they did not fit the analysis window)".to_string()
        } else {
            blocks[..kept].join("\n\n")
        };
        let omitted_note = match blocks.len() - kept {
            0 => String::new(),
            n => format!("\n\n({n} additional listings omitted to fit the analysis window.)"),
        };

        let prompt = fill_common(ANALYSIS_PROMPT_TEMPLATE, params, &trend_block)
            .replace("{listings_block}", &listings_block)
            .replace("{omitted_note}", &omitted_note);

        if prompt.chars().count() <= char_budget || kept == 0 {
            return truncate_to_budget(prompt, char_budget);
        }
        kept -= 1;
    }
}

/// Builds the standalone trend-analysis prompt.
pub fn build_trend_analysis(category: &str, trends: &TrendData, char_budget: usize) -> String {
    let prompt = TREND_ANALYSIS_PROMPT_TEMPLATE
        .replace("{category}", category)
        .replace("{trend_block}", &render_trend_block(trends));
    truncate_to_budget(prompt, char_budget)
}

fn fill_common(template: &str, params: &SearchParams, trend_block: &str) -> String {
    template
        .replace("{role}", &params.role)
        .replace("{location}", &params.location)
        .replace("{experience_years}", &params.experience_years.to_string())
        .replace("{skills}", &params.skills_line())
        .replace("{trend_block}", trend_block)
}

fn render_listing_block(listing: &Listing) -> String {
    let mut block = format!(
        "- Title: {}\n  Company: {}\n  Location: {}\n  URL: {}",
        listing.title, listing.company, listing.location, listing.url
    );
    if let Some(experience) = &listing.experience {
        block.push_str(&format!("\n  Experience: {experience}"));
    }
    if !listing.raw_text.trim().is_empty() {
        block.push_str(&format!("\n  Details: {}", listing.raw_text.trim()));
    }
    block
}

fn render_trend_block(trends: &TrendData) -> String {
    let mut block = format!(
        "Domain: {}\nSalary range: {}\nDemand level: {}\nTop skills: {}",
        trends.domain,
        trends.salary_range,
        trends.demand_level,
        trends.top_skills.join(", ")
    );
    if let Some(rate) = trends.growth_rate {
        block.push_str(&format!("\nAnnual growth: {:.0}%", rate * 100.0));
    }
    block
}

/// Last-resort hard cap: cuts at a char boundary if the scaffold alone is
/// over budget. Normal truncation drops whole listings first.
fn truncate_to_budget(prompt: String, char_budget: usize) -> String {
    if prompt.chars().count() <= char_budget {
        return prompt;
    }
    prompt.chars().take(char_budget).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn params() -> SearchParams {
        SearchParams {
            role: "Data Scientist".to_string(),
            location: "Remote".to_string(),
            experience_years: 3,
            skills: BTreeSet::from(["Python".to_string(), "SQL".to_string()]),
        }
    }

    fn trends() -> TrendData {
        TrendData {
            domain: "Data Science".to_string(),
            salary_range: "$95k – $160k".to_string(),
            demand_level: "High".to_string(),
            top_skills: vec!["Python".to_string(), "SQL".to_string()],
            growth_rate: Some(0.21),
        }
    }

    fn listing(i: usize, detail_len: usize) -> Listing {
        Listing {
            title: format!("Data Scientist {i}"),
            company: format!("Company {i}"),
            location: "Remote".to_string(),
            url: format!("https://example.com/jobs/{i}"),
            raw_text: "x".repeat(detail_len),
            experience: Some("3 years".to_string()),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let listings = vec![listing(1, 100), listing(2, 100)];
        let a = build(&params(), &listings, &trends(), 12_000);
        let b = build(&params(), &listings, &trends(), 12_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_listings_state_no_matches_explicitly() {
        let prompt = build(&params(), &[], &trends(), 12_000);
        assert!(prompt.contains("No job listings matched the search criteria."));
        assert!(prompt.contains("Do NOT invent job listings."));
    }

    #[test]
    fn test_prompt_includes_params_listings_and_trends() {
        let listings = vec![listing(1, 50)];
        let prompt = build(&params(), &listings, &trends(), 12_000);
        assert!(prompt.contains("Data Scientist position"));
        assert!(prompt.contains("Python, SQL"));
        assert!(prompt.contains("Company 1"));
        assert!(prompt.contains("Salary range: $95k – $160k"));
        assert!(prompt.contains("Annual growth: 21%"));
    }

    #[test]
    fn test_over_budget_listings_are_truncated_with_note() {
        let budget = 2_500;
        let listings: Vec<Listing> = (0..10).map(|i| listing(i, 400)).collect();
        let prompt = build(&params(), &listings, &trends(), budget);

        assert!(prompt.chars().count() <= budget);
        assert!(prompt.contains("additional listings omitted"));
        // First listing survives; the tail is dropped in order.
        assert!(prompt.contains("Company 0"));
        assert!(!prompt.contains("Company 9"));
    }

    #[test]
    fn test_listings_within_budget_are_all_kept() {
        let listings: Vec<Listing> = (0..3).map(|i| listing(i, 50)).collect();
        let prompt = build(&params(), &listings, &trends(), 12_000);
        assert!(prompt.contains("Company 2"));
        assert!(!prompt.contains("omitted"));
    }

    #[test]
    fn test_budget_holds_even_when_scaffold_is_oversized() {
        let prompt = build(&params(), &[listing(1, 10)], &trends(), 200);
        assert!(prompt.chars().count() <= 200);
    }

    #[test]
    fn test_trend_analysis_prompt_names_category() {
        let prompt = build_trend_analysis("Data Science", &trends(), 12_000);
        assert!(prompt.contains("the Data Science industry"));
        assert!(prompt.contains("INDUSTRY TRENDS SUMMARY"));
    }
}
