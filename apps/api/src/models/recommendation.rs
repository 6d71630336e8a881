//! Ranked job recommendation extracted from a model completion.

use serde::{Deserialize, Serialize};

use crate::models::listing::Listing;

/// One ranked job suggestion with pros/cons/advice pulled out of the
/// completion text. Ranks are unique within a response and within 1..=3.
///
/// `listing` is `None` (with `listing_unmatched` set) when the ranked section
/// could not be associated with any scraped listing — the section is kept
/// rather than discarded so the user still sees the model's pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub rank: u8,
    pub listing: Option<Listing>,
    pub listing_unmatched: bool,
    /// Section title as the model wrote it (used for display when unmatched).
    pub heading: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub advice: String,
}
