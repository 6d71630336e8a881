//! Search input model — the immutable parameter set a user submits once per run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// User-provided job-search parameters. Immutable once submitted.
///
/// Skills are kept in a `BTreeSet` so downstream prompt construction iterates
/// them in a stable order regardless of input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub role: String,
    pub location: String,
    pub experience_years: u32,
    pub skills: BTreeSet<String>,
}

impl SearchParams {
    /// Lowercased, hyphen-joined form used in job-board URL patterns
    /// ("Data Scientist" → "data-scientist").
    pub fn formatted_role(&self) -> String {
        slugify(&self.role, '-')
    }

    pub fn formatted_location(&self) -> String {
        slugify(&self.location, '-')
    }

    /// Stable comma-separated skill list for prompt text.
    pub fn skills_line(&self) -> String {
        self.skills
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lowercases and replaces whitespace runs with `sep`.
pub fn slugify(text: &str, sep: char) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&sep.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams {
            role: "Data Scientist".to_string(),
            location: "New York".to_string(),
            experience_years: 3,
            skills: ["Python", "SQL"].iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_formatted_role_is_lowercase_hyphenated() {
        assert_eq!(params().formatted_role(), "data-scientist");
    }

    #[test]
    fn test_formatted_location_collapses_whitespace() {
        let mut p = params();
        p.location = "  San   Francisco ".to_string();
        assert_eq!(p.formatted_location(), "san-francisco");
    }

    #[test]
    fn test_skills_line_is_sorted_and_stable() {
        let mut p = params();
        p.skills = ["SQL", "Python", "Airflow"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // BTreeSet iteration order, not insertion order
        assert_eq!(p.skills_line(), "Airflow, Python, SQL");
    }

    #[test]
    fn test_deserializes_from_ui_json() {
        let json = serde_json::json!({
            "role": "Data Scientist",
            "location": "Remote",
            "experience_years": 3,
            "skills": ["Python", "SQL", "Python"]
        });
        let p: SearchParams = serde_json::from_value(json).unwrap();
        assert_eq!(p.skills.len(), 2, "duplicate skills collapse into the set");
    }
}
