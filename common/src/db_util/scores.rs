use super::conversions;
use crate::countries::Roster;
use crate::scoring;
use crate::{
    BreakdownFilter, BreakdownReport, CategoryScores, CategoryTotals, LeaderboardEntry,
    ScoreError, ScoreRecord, UserBreakdown,
};
use diesel::prelude::*;

table! {
    scores (user_id, country) {
        user_id -> Text,
        country -> Text,
        total_score -> Integer,
        song -> Integer,
        vocal -> Integer,
        staging -> Integer,
        camp -> Integer,
    }
}

#[derive(Queryable, QueryableByName)]
#[diesel(table_name = scores)]
struct ScorePrivate {
    user_id: String,
    country: String,
    total_score: i32,
    song: i32,
    vocal: i32,
    staging: i32,
    camp: i32,
}

fn private_to_public(p: ScorePrivate) -> Result<ScoreRecord, ScoreError> {
    use conversions::*;
    Ok(ScoreRecord {
        user_id: p.user_id,
        country: p.country,
        total_score: i32_to_u8(p.total_score).map_err(ScoreError::Conversion)?,
        song: i32_to_u8(p.song).map_err(ScoreError::Conversion)?,
        vocal: i32_to_u8(p.vocal).map_err(ScoreError::Conversion)?,
        staging: i32_to_u8(p.staging).map_err(ScoreError::Conversion)?,
        camp: i32_to_u8(p.camp).map_err(ScoreError::Conversion)?,
    })
}

/// One user's four category values for a country, or all-zero defaults
/// when no row exists. The read path never errors on missing data.
pub fn get_scores(
    conn: &mut PgConnection,
    in_user_id: &str,
    in_country: &str,
) -> Result<CategoryScores, ScoreError> {
    use self::scores::dsl::*;

    let row = scores
        .filter(user_id.eq(in_user_id))
        .filter(country.eq(in_country))
        .first::<ScorePrivate>(conn)
        .optional()?;

    match row {
        None => Ok(CategoryScores::default()),
        Some(p) => {
            let record = private_to_public(p)?;
            Ok(CategoryScores {
                song: record.song,
                vocal: record.vocal,
                staging: record.staging,
                camp: record.camp,
            })
        }
    }
}

/// Validate and store one user's ratings for one country, first
/// submission or overwrite alike.
///
/// The write is a single upsert statement, so all five columns land
/// together or not at all and the stored total always equals the sum of
/// the four categories. Last write wins per (user, country).
///
/// # Errors
/// `UnknownCountry` and `CategoryOutOfRange` before anything is written;
/// `Database` if the statement itself fails, leaving prior state intact.
pub fn submit_scores(
    conn: &mut PgConnection,
    roster: &Roster,
    in_user_id: &str,
    in_country: &str,
    in_scores: &CategoryScores,
) -> Result<ScoreRecord, ScoreError> {
    use diesel::sql_query;
    use diesel::sql_types::{Integer, Text};

    if !roster.contains(in_country) {
        return Err(ScoreError::UnknownCountry(in_country.to_string()));
    }
    scoring::validate(in_scores)?;

    // total_score is derived here, never accepted as input
    let total = conversions::u8_to_i32(in_scores.total()).map_err(ScoreError::Conversion)?;
    let as_column = |v: u8| conversions::u8_to_i32(v).map_err(ScoreError::Conversion);

    let query = "INSERT INTO scores (user_id, country, total_score, song, vocal, staging, camp)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id, country) DO UPDATE
        SET total_score = EXCLUDED.total_score,
            song = EXCLUDED.song,
            vocal = EXCLUDED.vocal,
            staging = EXCLUDED.staging,
            camp = EXCLUDED.camp
        RETURNING *;";

    sql_query(query)
        .bind::<Text, _>(in_user_id)
        .bind::<Text, _>(in_country)
        .bind::<Integer, _>(total)
        .bind::<Integer, _>(as_column(in_scores.song)?)
        .bind::<Integer, _>(as_column(in_scores.vocal)?)
        .bind::<Integer, _>(as_column(in_scores.staging)?)
        .bind::<Integer, _>(as_column(in_scores.camp)?)
        .get_result::<ScorePrivate>(conn)
        .map_err(ScoreError::Database)
        .and_then(private_to_public)
        .inspect(|record| {
            log::debug!(
                "stored scores for ({}, {}): total {}",
                record.user_id,
                record.country,
                record.total_score
            );
        })
}

/// Sum every user's total per country and merge with the roster: exactly
/// one entry per configured country, unscored countries at zero, ordered
/// by total descending (country name breaks ties).
pub fn leaderboard(
    conn: &mut PgConnection,
    roster: &Roster,
) -> Result<Vec<LeaderboardEntry>, ScoreError> {
    use self::scores::dsl::*;
    use diesel::dsl::sum;

    let rows: Vec<(String, Option<i64>)> = scores
        .group_by(country)
        .select((country, sum(total_score)))
        .load(conn)?;

    let rows = rows
        .into_iter()
        .map(|(name, summed)| Ok((name, conversions::sum_to_u64(summed)?)))
        .collect::<Result<Vec<(String, u64)>, String>>()
        .map_err(ScoreError::Conversion)?;

    Ok(scoring::assemble_leaderboard(roster, rows))
}

fn country_totals(conn: &mut PgConnection, in_country: &str) -> Result<CategoryTotals, ScoreError> {
    use self::scores::dsl::*;
    use diesel::dsl::sum;

    let (song_sum, vocal_sum, staging_sum, camp_sum): (
        Option<i64>,
        Option<i64>,
        Option<i64>,
        Option<i64>,
    ) = scores
        .filter(country.eq(in_country))
        .select((sum(song), sum(vocal), sum(staging), sum(camp)))
        .first(conn)?;

    use conversions::sum_to_u64;
    Ok(CategoryTotals {
        song: sum_to_u64(song_sum).map_err(ScoreError::Conversion)?,
        vocal: sum_to_u64(vocal_sum).map_err(ScoreError::Conversion)?,
        staging: sum_to_u64(staging_sum).map_err(ScoreError::Conversion)?,
        camp: sum_to_u64(camp_sum).map_err(ScoreError::Conversion)?,
    })
}

/// Per-category aggregates for one country: all-user sums, and when
/// filtered to one user, their own values plus the "everyone else"
/// complement series for the stacked chart.
pub fn breakdown(
    conn: &mut PgConnection,
    roster: &Roster,
    in_country: &str,
    filter: &BreakdownFilter,
) -> Result<BreakdownReport, ScoreError> {
    if !roster.contains(in_country) {
        return Err(ScoreError::UnknownCountry(in_country.to_string()));
    }

    let totals = country_totals(conn, in_country)?;

    let user = match filter {
        BreakdownFilter::All => None,
        BreakdownFilter::User(name) => {
            let own = get_scores(conn, name, in_country)?;
            Some(UserBreakdown {
                user_id: name.clone(),
                scores: own,
                everyone_else: scoring::complement_of(&totals, &own),
            })
        }
    };

    Ok(BreakdownReport {
        country: in_country.to_string(),
        totals,
        user,
    })
}

/// The distinct users who have scored a country, sorted by name.
/// Feeds the breakdown filter dropdown.
pub fn scored_users(conn: &mut PgConnection, in_country: &str) -> Result<Vec<String>, ScoreError> {
    use self::scores::dsl::*;

    scores
        .filter(country.eq(in_country))
        .select(user_id)
        .distinct()
        .order(user_id.asc())
        .load::<String>(conn)
        .map_err(ScoreError::Database)
}
