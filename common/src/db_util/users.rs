use super::conversions;
use crate::{Credential, ScoreError, TOKEN_LENGTH, UserRecord};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use rand::Rng;
use rand::distr::Alphanumeric;

table! {
    users (user_id) {
        user_id -> Text,
        token -> Text,
    }
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = users)]
struct UserPrivate {
    user_id: String,
    token: String,
}

fn private_to_public(p: UserPrivate) -> UserRecord {
    UserRecord {
        user_id: p.user_id,
        token: p.token,
    }
}

/// A fresh URL-safe session token, the same length as the original's
/// `secrets.token_urlsafe()` output.
fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn map_insert_error(err: diesel::result::Error, name: &str) -> ScoreError {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ScoreError::NameTaken(name.to_string())
        }
        other => ScoreError::Database(other),
    }
}

/// Register a display name and hand back its credential.
///
/// This is a single INSERT backed by the `users` primary key, so two
/// simultaneous registrations of the same name cannot both land: the
/// loser's unique violation comes back as `NameTaken` with no mutation.
///
/// # Errors
/// `EmptyName` for a blank name, `NameTaken` for a duplicate, `Database`
/// for anything else.
pub fn register_user(conn: &mut PgConnection, name: &str) -> Result<Credential, ScoreError> {
    use self::users::dsl::*;

    let name = name.trim();
    if name.is_empty() {
        return Err(ScoreError::EmptyName);
    }

    let insert_row = UserPrivate {
        user_id: name.to_string(),
        token: generate_token(),
    };

    let result: UserPrivate = diesel::insert_into(users)
        .values(&insert_row)
        .get_result(conn)
        .map_err(|err| map_insert_error(err, name))?;

    log::debug!("registered user \"{}\"", result.user_id);

    Ok(Credential {
        user_id: result.user_id,
        token: result.token,
    })
}

/// Resolve a session token to its user, `None` for an unknown token.
pub fn get_user_by_token(
    conn: &mut PgConnection,
    session_token: &str,
) -> Result<Option<UserRecord>, ScoreError> {
    use self::users::dsl::*;

    let row = users
        .filter(token.eq(session_token))
        .first::<UserPrivate>(conn)
        .optional()?;

    Ok(row.map(private_to_public))
}

pub fn user_exists(conn: &mut PgConnection, name: &str) -> Result<bool, ScoreError> {
    use self::users::dsl::*;
    use diesel::dsl::count_star;

    let count: i64 = users
        .filter(user_id.eq(name))
        .select(count_star())
        .first(conn)?;

    conversions::i64_to_u64(count)
        .map(|n| n > 0)
        .map_err(ScoreError::Conversion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn generated_tokens_are_url_safe_and_long_enough() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        // Opaque means not predictable; two draws colliding would be absurd
        assert_ne!(token, generate_token());
    }

    #[test_log::test]
    fn unique_violation_maps_to_name_taken() {
        let err = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        );
        match map_insert_error(err, "Alex") {
            ScoreError::NameTaken(name) => assert_eq!(name, "Alex"),
            other => panic!("expected NameTaken, got {other:?}"),
        }
    }

    #[test_log::test]
    fn other_database_errors_pass_through() {
        let err = diesel::result::Error::NotFound;
        assert!(matches!(
            map_insert_error(err, "Alex"),
            ScoreError::Database(diesel::result::Error::NotFound)
        ));
    }
}
