//! Explicit per-request session context.
//!
//! The token travels in the `X-Douze-Token` header and is resolved to a
//! user here; handlers and the engine below them only ever see a plain
//! `user_id`.

use douze_common::TOKEN_HEADER;
use douze_common::db_util::{PgPool, get_pooled_database_connection, get_user_by_token};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

/// The resolved identity of the requesting visitor.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(session_token) = request.headers().get_one(TOKEN_HEADER) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };
        let Some(pool) = request.rocket().state::<PgPool>() else {
            tracing::error!("database pool is not in managed state");
            return Outcome::Error((Status::InternalServerError, ()));
        };
        let mut conn = match get_pooled_database_connection(pool) {
            Ok(conn) => conn,
            Err(err) => {
                tracing::error!("could not get a database connection: {err}");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };
        match get_user_by_token(&mut conn, session_token) {
            Ok(Some(user)) => Outcome::Success(Session {
                user_id: user.user_id,
            }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(err) => {
                tracing::error!("session lookup failed: {err}");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
