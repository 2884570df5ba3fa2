//! A library with common utilities for the douze party scoreboard.

pub mod countries;
pub mod scoring;

#[cfg(feature = "network")]
pub mod client_api;
#[cfg(feature = "database")]
pub mod db_util;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLIENT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Highest score a guest can hand out in a single category.
pub const MAX_CATEGORY_SCORE: u8 = 12;

/// Length of a generated session token.
pub const TOKEN_LENGTH: usize = 43;

/// Header carrying the session token on every authenticated request.
pub const TOKEN_HEADER: &str = "X-Douze-Token";

/// The four rating categories, in display order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Song,
    Vocal,
    Staging,
    Camp,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Song,
        Category::Vocal,
        Category::Staging,
        Category::Camp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Song => "song",
            Category::Vocal => "vocal",
            Category::Staging => "staging",
            Category::Camp => "camp",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's four category ratings for one country.
/// The lower bound is structural (`u8`); the upper bound is checked by
/// `scoring::validate` before anything reaches storage.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub song: u8,
    pub vocal: u8,
    pub staging: u8,
    pub camp: u8,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Song => self.song,
            Category::Vocal => self.vocal,
            Category::Staging => self.staging,
            Category::Camp => self.camp,
        }
    }

    /// Sum of the four ratings. Maxes out at 48, so `u8` is plenty.
    pub fn total(&self) -> u8 {
        self.song + self.vocal + self.staging + self.camp
    }
}

/// Per-category sums across every user who scored a country.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub song: u64,
    pub vocal: u64,
    pub staging: u64,
    pub camp: u64,
}

/// The credential handed back at registration. The token is the caller's
/// session marker, not a cryptographic identity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    pub token: String,
}

/// A registered participant as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub token: String,
}

/// A fully stored score row, echoed back after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub user_id: String,
    pub country: String,
    pub total_score: u8,
    pub song: u8,
    pub vocal: u8,
    pub staging: u8,
    pub camp: u8,
}

/// One leaderboard line: a country and the sum of every user's total for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub country: String,
    pub total_score: u64,
}

/// Which slice of a country's scores a breakdown should report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakdownFilter {
    All,
    User(String),
}

impl BreakdownFilter {
    /// The original filter dropdown put the literal `All` ahead of the user
    /// list, so both an absent value and `All` mean everyone.
    pub fn from_query(user: Option<&str>) -> Self {
        match user {
            None | Some("All") => BreakdownFilter::All,
            Some(name) => BreakdownFilter::User(name.to_string()),
        }
    }
}

/// Per-category aggregates for one country, chart-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownReport {
    pub country: String,
    /// All-user sums for the country, zeros when nobody has scored it.
    pub totals: CategoryTotals,
    /// Present when the breakdown was filtered to a single user.
    pub user: Option<UserBreakdown>,
}

/// A single user's slice of a country breakdown, plus the complement
/// series used to stack "everyone else" on top of their bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBreakdown {
    pub user_id: String,
    pub scores: CategoryScores,
    pub everyone_else: CategoryTotals,
}

/// Everything that can go wrong between a request and the score store.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("the name \"{0}\" is already taken")]
    NameTaken(String),
    #[error("a display name cannot be empty")]
    EmptyName,
    #[error("{category} score {value} is out of range (maximum is {MAX_CATEGORY_SCORE})")]
    CategoryOutOfRange { category: Category, value: u8 },
    #[error("unknown country \"{0}\"")]
    UnknownCountry(String),
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[cfg(feature = "database")]
    #[error("stored value out of range: {0}")]
    Conversion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn category_scores_total_is_the_sum() {
        let scores = CategoryScores {
            song: 10,
            vocal: 8,
            staging: 7,
            camp: 5,
        };
        assert_eq!(scores.total(), 30);
        assert_eq!(CategoryScores::default().total(), 0);
    }

    #[test_log::test]
    fn category_scores_serialize_with_lowercase_keys() {
        let scores = CategoryScores {
            song: 1,
            vocal: 2,
            staging: 3,
            camp: 4,
        };
        let json = serde_json::to_value(scores).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"song": 1, "vocal": 2, "staging": 3, "camp": 4})
        );
    }

    #[test_log::test]
    fn breakdown_filter_treats_all_sentinel_as_everyone() {
        assert_eq!(BreakdownFilter::from_query(None), BreakdownFilter::All);
        assert_eq!(
            BreakdownFilter::from_query(Some("All")),
            BreakdownFilter::All
        );
        assert_eq!(
            BreakdownFilter::from_query(Some("Alex")),
            BreakdownFilter::User("Alex".to_string())
        );
    }
}
