//! Score validation and the pure half of the aggregate queries.
//!
//! The database hands back sparse sums; everything order- or
//! completeness-sensitive happens here so it can be tested without a
//! database.

use crate::countries::Roster;
use crate::{Category, CategoryScores, CategoryTotals, LeaderboardEntry, ScoreError};
use itertools::Itertools;
use std::collections::HashMap;

/// Check every category against the [0, 12] range.
/// The input widgets already clamp to this range, but the engine does not
/// trust its callers.
///
/// # Errors
/// Returns `CategoryOutOfRange` naming the first offending category.
pub fn validate(scores: &CategoryScores) -> Result<(), ScoreError> {
    for category in Category::ALL {
        let value = scores.get(category);
        if value > crate::MAX_CATEGORY_SCORE {
            return Err(ScoreError::CategoryOutOfRange { category, value });
        }
    }
    Ok(())
}

/// Merge sparse per-country sums into a full leaderboard: every roster
/// country appears exactly once, unscored countries count 0, ordered by
/// total descending with country name ascending as the tiebreak.
/// Rows for countries outside the roster are dropped.
pub fn assemble_leaderboard(roster: &Roster, rows: Vec<(String, u64)>) -> Vec<LeaderboardEntry> {
    let summed: HashMap<String, u64> = rows.into_iter().collect();

    roster
        .iter()
        .map(|country| LeaderboardEntry {
            country: country.to_string(),
            total_score: summed.get(country).copied().unwrap_or(0),
        })
        .sorted_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| a.country.cmp(&b.country))
        })
        .collect()
}

/// The "everyone else" series of a single-user breakdown: the all-user
/// sums minus that user's own contribution. Saturating, so a stale or
/// inconsistent read can never underflow.
pub fn complement_of(totals: &CategoryTotals, own: &CategoryScores) -> CategoryTotals {
    CategoryTotals {
        song: totals.song.saturating_sub(u64::from(own.song)),
        vocal: totals.vocal.saturating_sub(u64::from(own.vocal)),
        staging: totals.staging.saturating_sub(u64::from(own.staging)),
        camp: totals.camp.saturating_sub(u64::from(own.camp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_country_roster() -> Roster {
        Roster::parse("Sweden,France").unwrap()
    }

    #[test_log::test]
    fn validate_accepts_the_full_range() {
        for value in 0..=12 {
            let scores = CategoryScores {
                song: value,
                vocal: 12 - value,
                staging: 0,
                camp: 12,
            };
            assert!(validate(&scores).is_ok());
        }
    }

    #[test_log::test]
    fn validate_rejects_a_thirteen() {
        let scores = CategoryScores {
            song: 13,
            vocal: 0,
            staging: 0,
            camp: 0,
        };
        match validate(&scores) {
            Err(ScoreError::CategoryOutOfRange { category, value }) => {
                assert_eq!(category, Category::Song);
                assert_eq!(value, 13);
            }
            other => panic!("expected CategoryOutOfRange, got {other:?}"),
        }
    }

    #[test_log::test]
    fn leaderboard_is_complete_with_no_scores() {
        let board = assemble_leaderboard(&two_country_roster(), vec![]);
        // Both zero, so the name tiebreak puts France first
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].country, "France");
        assert_eq!(board[0].total_score, 0);
        assert_eq!(board[1].country, "Sweden");
        assert_eq!(board[1].total_score, 0);
    }

    #[test_log::test]
    fn leaderboard_sums_across_users() {
        // user1 scored Sweden 30, user2 scored Sweden 8
        let board =
            assemble_leaderboard(&two_country_roster(), vec![("Sweden".to_string(), 38)]);
        assert_eq!(board[0].country, "Sweden");
        assert_eq!(board[0].total_score, 38);
        assert_eq!(board[1].country, "France");
        assert_eq!(board[1].total_score, 0);
    }

    #[test_log::test]
    fn leaderboard_orders_by_total_descending() {
        let roster = Roster::parse("Sweden,France,Estonia").unwrap();
        let rows = vec![
            ("Sweden".to_string(), 10),
            ("France".to_string(), 25),
            ("Estonia".to_string(), 10),
        ];
        let board = assemble_leaderboard(&roster, rows);
        let names: Vec<&str> = board.iter().map(|e| e.country.as_str()).collect();
        // Estonia before Sweden on the name tiebreak
        assert_eq!(names, ["France", "Estonia", "Sweden"]);
    }

    #[test_log::test]
    fn leaderboard_drops_rows_outside_the_roster() {
        let board = assemble_leaderboard(
            &two_country_roster(),
            vec![("Sweden".to_string(), 5), ("Atlantis".to_string(), 99)],
        );
        assert_eq!(board.len(), 2);
        assert!(board.iter().all(|e| e.country != "Atlantis"));
    }

    #[test_log::test]
    fn complement_matches_the_two_user_fixture() {
        // user1: 10/8/7/5 and user2: 2/2/2/2 scored the same country
        let totals = CategoryTotals {
            song: 12,
            vocal: 10,
            staging: 9,
            camp: 7,
        };
        let user1 = CategoryScores {
            song: 10,
            vocal: 8,
            staging: 7,
            camp: 5,
        };
        assert_eq!(
            complement_of(&totals, &user1),
            CategoryTotals {
                song: 2,
                vocal: 2,
                staging: 2,
                camp: 2,
            }
        );
    }

    #[test_log::test]
    fn complement_saturates_instead_of_underflowing() {
        let totals = CategoryTotals::default();
        let own = CategoryScores {
            song: 5,
            vocal: 0,
            staging: 0,
            camp: 0,
        };
        assert_eq!(complement_of(&totals, &own), CategoryTotals::default());
    }
}
