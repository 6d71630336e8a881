//! Result Parser — extracts ranked recommendations from a free-text completion.
//!
//! The marker vocabulary is provider/prompt-specific and deliberately
//! configurable: `MarkerConfig::default()` matches the headings our own
//! prompt templates request, but callers can widen it when a model drifts.
//!
//! Parsing is pure and idempotent — no state, no I/O.

use std::collections::HashSet;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::listing::Listing;
use crate::models::recommendation::Recommendation;

/// Highest rank extracted; ranked sections beyond this are ignored.
const MAX_RANK: usize = 3;

/// Configurable rank-marker and section-heading vocabulary.
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    /// Per-rank marker alternatives, index 0 → rank 1. Lowercase.
    pub rank_markers: Vec<Vec<String>>,
    pub pros_headings: Vec<String>,
    pub cons_headings: Vec<String>,
    pub advice_headings: Vec<String>,
    pub skills_headings: Vec<String>,
    pub tips_headings: Vec<String>,
    /// Minimum title/company token-overlap for a listing association.
    pub similarity_floor: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        let ordinal = ["1st", "2nd", "3rd"];
        let rank_markers = (1..=MAX_RANK)
            .map(|rank| {
                vec![
                    format!("#{rank}"),
                    format!("{rank}."),
                    format!("{rank})"),
                    ordinal[rank - 1].to_string(),
                    format!("rank {rank}"),
                    format!("top pick {rank}"),
                ]
            })
            .collect();

        Self {
            rank_markers,
            pros_headings: vec!["pros".to_string()],
            cons_headings: vec!["cons".to_string()],
            advice_headings: vec!["advice".to_string(), "recommendation".to_string()],
            skills_headings: vec![
                "skills match analysis".to_string(),
                "skills match".to_string(),
            ],
            tips_headings: vec!["application tips".to_string()],
            similarity_floor: 0.2,
        }
    }
}

impl MarkerConfig {
    /// Matches a decorated line against the rank markers. Returns the rank
    /// and the heading text that follows the marker.
    fn match_rank(&self, stripped: &str, lower: &str) -> Option<(u8, String)> {
        for (idx, alternatives) in self.rank_markers.iter().enumerate() {
            for marker in alternatives {
                if let Some(lower_rest) = lower.strip_prefix(marker.as_str()) {
                    // "#1" must not swallow "#10"
                    if lower_rest.starts_with(|c: char| c.is_ascii_digit()) {
                        continue;
                    }
                    let heading = stripped
                        .get(marker.len()..)
                        .unwrap_or("")
                        .trim_start_matches(|c: char| {
                            c.is_whitespace() || matches!(c, '—' | '-' | ':' | '.' | ')' | '*')
                        })
                        .trim_end_matches('*')
                        .trim();
                    return Some((idx as u8 + 1, heading.to_string()));
                }
            }
        }
        None
    }
}

fn matches_heading(stripped: &str, lower: &str, headings: &[String]) -> Option<String> {
    for heading in headings {
        if lower.starts_with(heading.as_str()) {
            let inline = stripped
                .get(heading.len()..)
                .unwrap_or("")
                .trim_start_matches([':', '*', ' '])
                .trim_end_matches('*')
                .trim()
                .to_string();
            return Some(inline);
        }
    }
    None
}

/// Drops leading bullets, emoji, and markdown decoration; keeps '#' so rank
/// markers like "#1" survive.
fn strip_decoration(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
        .trim_end()
}

/// Everything the parser can pull out of one completion.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedAnalysis {
    pub recommendations: Vec<Recommendation>,
    pub skills_analysis: Option<String>,
    pub application_tips: Option<String>,
}

#[derive(Debug)]
struct Section {
    rank: u8,
    heading: String,
    pros: Vec<String>,
    cons: Vec<String>,
    advice: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bucket {
    None,
    Pros,
    Cons,
    Advice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Global {
    None,
    Skills,
    Tips,
}

/// Parses `completion` into ranked recommendations plus the global analysis
/// sections. Fails with `UnparsableCompletion` only when no ranked section is
/// found at all — the caller treats that as degraded, not fatal.
pub fn parse(
    completion: &str,
    listings: &[Listing],
    config: &MarkerConfig,
) -> Result<ParsedAnalysis, AppError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;
    let mut bucket = Bucket::None;
    let mut global = Global::None;
    let mut skills_lines: Vec<String> = Vec::new();
    let mut tips_lines: Vec<String> = Vec::new();
    let mut seen_ranks: HashSet<u8> = HashSet::new();

    for line in completion.lines() {
        let stripped = strip_decoration(line);
        if stripped.is_empty() {
            continue;
        }
        let lower = stripped.to_lowercase();

        // New ranked section (first occurrence of each rank only).
        if let Some((rank, heading)) = config.match_rank(stripped, &lower) {
            if seen_ranks.insert(rank) {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                current = Some(Section {
                    rank,
                    heading,
                    pros: Vec::new(),
                    cons: Vec::new(),
                    advice: Vec::new(),
                });
                bucket = Bucket::None;
                global = Global::None;
                continue;
            }
            // Re-mentions of an already-seen rank fall through as plain text.
        }

        // Global sections close any open ranked section.
        if let Some(inline) = matches_heading(stripped, &lower, &config.skills_headings) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            global = Global::Skills;
            bucket = Bucket::None;
            if !inline.is_empty() {
                skills_lines.push(inline);
            }
            continue;
        }
        if let Some(inline) = matches_heading(stripped, &lower, &config.tips_headings) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            global = Global::Tips;
            bucket = Bucket::None;
            if !inline.is_empty() {
                tips_lines.push(inline);
            }
            continue;
        }

        // Sub-headings inside a ranked section.
        if let Some(section) = current.as_mut() {
            if let Some(inline) = matches_heading(stripped, &lower, &config.pros_headings) {
                bucket = Bucket::Pros;
                if !inline.is_empty() {
                    section.pros.push(inline);
                }
                continue;
            }
            if let Some(inline) = matches_heading(stripped, &lower, &config.cons_headings) {
                bucket = Bucket::Cons;
                if !inline.is_empty() {
                    section.cons.push(inline);
                }
                continue;
            }
            if let Some(inline) = matches_heading(stripped, &lower, &config.advice_headings) {
                bucket = Bucket::Advice;
                if !inline.is_empty() {
                    section.advice.push(inline);
                }
                continue;
            }
        }

        // Plain content line — routed by the active bucket.
        match (current.as_mut(), bucket, global) {
            (_, _, Global::Skills) => skills_lines.push(stripped.to_string()),
            (_, _, Global::Tips) => tips_lines.push(stripped.to_string()),
            (Some(section), Bucket::Pros, _) => push_item(&mut section.pros, line, stripped),
            (Some(section), Bucket::Cons, _) => push_item(&mut section.cons, line, stripped),
            (Some(section), Bucket::Advice, _) => section.advice.push(stripped.to_string()),
            _ => {} // preamble / banner lines
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    if sections.is_empty() {
        return Err(AppError::UnparsableCompletion);
    }

    sections.sort_by_key(|s| s.rank);
    let recommendations = sections
        .into_iter()
        .map(|section| {
            let listing = best_match(&section.heading, listings, config.similarity_floor);
            Recommendation {
                rank: section.rank,
                listing_unmatched: listing.is_none(),
                listing: listing.cloned(),
                heading: section.heading,
                pros: section.pros,
                cons: section.cons,
                advice: section.advice.join(" ").trim().to_string(),
            }
        })
        .collect();

    Ok(ParsedAnalysis {
        recommendations,
        skills_analysis: join_section(skills_lines),
        application_tips: join_section(tips_lines),
    })
}

/// Bullet lines start new items; bare continuation lines extend the last one.
fn push_item(items: &mut Vec<String>, raw_line: &str, stripped: &str) {
    let trimmed = raw_line.trim();
    let is_bullet = trimmed.starts_with(['-', '*', '•']);
    if is_bullet || items.is_empty() {
        items.push(stripped.to_string());
    } else {
        let last = items.last_mut().expect("non-empty");
        last.push(' ');
        last.push_str(stripped);
    }
}

fn join_section(lines: Vec<String>) -> Option<String> {
    let joined = lines.join("\n").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

// ────────────────────────────────────────────────────────────────────────────
// Listing association
// ────────────────────────────────────────────────────────────────────────────

/// Associates a section heading with the nearest listing by token overlap
/// over title + company. Returns `None` below the similarity floor.
fn best_match<'a>(heading: &str, listings: &'a [Listing], floor: f32) -> Option<&'a Listing> {
    listings
        .iter()
        .map(|listing| (similarity(heading, &listing.match_key()), listing))
        .filter(|(score, _)| *score >= floor)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, listing)| listing)
}

/// Jaccard overlap of lowercase alphanumeric tokens.
pub fn similarity(a: &str, b: &str) -> f32 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count() as f32;
    let union = ta.union(&tb).count() as f32;
    intersection / union
}

fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, company: &str) -> Listing {
        Listing {
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            url: format!("https://example.com/{}", company.to_lowercase()),
            raw_text: String::new(),
            experience: None,
        }
    }

    fn listings() -> Vec<Listing> {
        vec![
            listing("Senior Data Scientist", "Acme Corp"),
            listing("ML Engineer", "Initech"),
            listing("Data Analyst", "Globex"),
        ]
    }

    const COMPLETION: &str = "\
💼 TOP JOB RECOMMENDATIONS

#1 — Senior Data Scientist at Acme Corp
Pros:
- Strong skills overlap with Python and SQL
- Salary at the top of the market range
Cons:
- On-call rotation
Advice: Lead with your production ML experience.

#2 — ML Engineer at Initech
Pros:
- Growing team
Cons:
- Below-market salary
  for the region
Advice: Ask about model deployment practices.

#3 — Quantum Flux Officer at Unknown Startup
Pros:
- Novel domain
Cons:
- Role is vaguely specified
Advice: Clarify the responsibilities before applying.

🔍 SKILLS MATCH ANALYSIS
Your Python and SQL skills align with two of the three roles.

📝 APPLICATION TIPS
Quantify impact on your resume.
Tailor each application.
";

    #[test]
    fn test_parses_three_ranked_sections_in_order() {
        let parsed = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        assert_eq!(parsed.recommendations.len(), 3);
        let ranks: Vec<u8> = parsed.recommendations.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_sections_match_listings_by_title_and_company() {
        let parsed = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        let first = &parsed.recommendations[0];
        assert!(!first.listing_unmatched);
        assert_eq!(first.listing.as_ref().unwrap().company, "Acme Corp");
        let second = &parsed.recommendations[1];
        assert_eq!(second.listing.as_ref().unwrap().company, "Initech");
    }

    #[test]
    fn test_unmatchable_section_is_kept_with_null_listing() {
        let parsed = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        let third = &parsed.recommendations[2];
        assert!(third.listing.is_none());
        assert!(third.listing_unmatched);
        assert!(third.heading.contains("Quantum Flux Officer"));
    }

    #[test]
    fn test_pros_cons_and_advice_extraction() {
        let parsed = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        let first = &parsed.recommendations[0];
        assert_eq!(first.pros.len(), 2);
        assert_eq!(first.cons, vec!["On-call rotation".to_string()]);
        assert_eq!(first.advice, "Lead with your production ML experience.");
    }

    #[test]
    fn test_continuation_lines_extend_the_previous_bullet() {
        let parsed = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        let second = &parsed.recommendations[1];
        assert_eq!(second.cons, vec!["Below-market salary for the region".to_string()]);
    }

    #[test]
    fn test_global_sections_are_extracted() {
        let parsed = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        assert!(parsed
            .skills_analysis
            .as_deref()
            .unwrap()
            .contains("align with two of the three roles"));
        let tips = parsed.application_tips.as_deref().unwrap();
        assert!(tips.contains("Quantify impact"));
        assert!(tips.contains("Tailor each application"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        let second = parse(COMPLETION, &listings(), &MarkerConfig::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_zero_rank_markers_is_unparsable() {
        let err = parse(
            "The market looks great. Apply broadly and network.",
            &listings(),
            &MarkerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::UnparsableCompletion));
    }

    #[test]
    fn test_fewer_than_three_sections_returns_what_exists() {
        let completion = "\
#1 — Senior Data Scientist at Acme Corp
Pros:
- Good fit
Advice: Apply now.

#2 — ML Engineer at Initech
Advice: Worth a look.
";
        let parsed = parse(completion, &listings(), &MarkerConfig::default()).unwrap();
        assert_eq!(parsed.recommendations.len(), 2);
        assert_eq!(parsed.recommendations[1].rank, 2);
    }

    #[test]
    fn test_duplicate_rank_mentions_do_not_split_sections() {
        let completion = "\
#1 — Senior Data Scientist at Acme Corp
Advice: As noted under #1 above, apply quickly.
";
        let parsed = parse(completion, &listings(), &MarkerConfig::default()).unwrap();
        assert_eq!(parsed.recommendations.len(), 1);
        assert!(parsed.recommendations[0].advice.contains("apply quickly"));
    }

    #[test]
    fn test_alternative_marker_vocabulary() {
        let completion = "\
1. Senior Data Scientist at Acme Corp
Pros:
- Great team
";
        let parsed = parse(completion, &listings(), &MarkerConfig::default()).unwrap();
        assert_eq!(parsed.recommendations[0].rank, 1);
        assert_eq!(
            parsed.recommendations[0].listing.as_ref().unwrap().company,
            "Acme Corp"
        );
    }

    #[test]
    fn test_custom_marker_config_is_honored() {
        let mut config = MarkerConfig::default();
        config.rank_markers[0].push("best option".to_string());
        let completion = "Best option: Data Analyst at Globex\nAdvice: Solid choice.";
        let parsed = parse(completion, &listings(), &config).unwrap();
        assert_eq!(parsed.recommendations[0].rank, 1);
        assert_eq!(
            parsed.recommendations[0].listing.as_ref().unwrap().company,
            "Globex"
        );
    }

    #[test]
    fn test_similarity_orders_closer_titles_higher() {
        let near = similarity(
            "Senior Data Scientist at Acme Corp",
            "Senior Data Scientist Acme Corp",
        );
        let far = similarity("Senior Data Scientist at Acme Corp", "ML Engineer Initech");
        assert!(near > far);
        assert!(near > 0.5);
        assert_eq!(similarity("", "anything"), 0.0);
    }
}
