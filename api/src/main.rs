//! A json api for the douze party scoreboard.

#[macro_use]
extern crate rocket;

mod helpers;
mod session;

use douze_common::countries::Roster;
use douze_common::db_util::{self, PgPool, PgPooledConn};
use douze_common::{
    BreakdownFilter, BreakdownReport, CategoryScores, Credential, LeaderboardEntry, ScoreRecord,
};
use helpers::{
    ApiError, ApiErrorBody, ApiErrorKind, ApiResult, CorsFairing, RequestTimingFairing,
    internal_error, not_found_error, score_error,
};
use rocket::State;
use rocket::response::status;
use rocket::serde::Deserialize;
use rocket::serde::json::{Json, Value, json};
use rocket_prometheus::PrometheusMetrics;
use session::Session;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
struct RegisterRequest {
    user_id: String,
}

fn connect(pool: &PgPool) -> Result<PgPooledConn, ApiError> {
    db_util::get_pooled_database_connection(pool).map_err(|err| internal_error(err.to_string()))
}

#[post("/register", data = "<request>")]
fn register(
    pool: &State<PgPool>,
    request: Json<RegisterRequest>,
) -> Result<status::Created<Json<Credential>>, ApiError> {
    let mut conn = connect(pool)?;
    let credential = db_util::register_user(&mut conn, &request.user_id)
        .map_err(|err| score_error(&err))?;
    Ok(status::Created::new("/session").body(Json(credential)))
}

#[get("/session")]
fn get_session(session: Session) -> Value {
    json!({ "user_id": session.user_id })
}

#[get("/countries")]
fn countries(roster: &State<Roster>) -> Json<Vec<String>> {
    Json(roster.names().to_vec())
}

#[get("/scores/<country>")]
fn get_scores(
    session: Session,
    pool: &State<PgPool>,
    roster: &State<Roster>,
    country: &str,
) -> ApiResult<CategoryScores> {
    if !roster.contains(country) {
        return Err(not_found_error(format!("unknown country \"{country}\"")));
    }
    let mut conn = connect(pool)?;
    db_util::get_scores(&mut conn, &session.user_id, country)
        .map(Json)
        .map_err(|err| score_error(&err))
}

#[post("/scores/<country>", data = "<scores>")]
fn post_scores(
    session: Session,
    pool: &State<PgPool>,
    roster: &State<Roster>,
    country: &str,
    scores: Json<CategoryScores>,
) -> ApiResult<ScoreRecord> {
    let mut conn = connect(pool)?;
    db_util::submit_scores(&mut conn, roster, &session.user_id, country, &scores)
        .map(Json)
        .map_err(|err| score_error(&err))
}

#[get("/leaderboard")]
fn leaderboard(pool: &State<PgPool>, roster: &State<Roster>) -> ApiResult<Vec<LeaderboardEntry>> {
    let mut conn = connect(pool)?;
    db_util::leaderboard(&mut conn, roster)
        .map(Json)
        .map_err(|err| score_error(&err))
}

#[get("/breakdown/<country>?<user>")]
fn breakdown(
    pool: &State<PgPool>,
    roster: &State<Roster>,
    country: &str,
    user: Option<&str>,
) -> ApiResult<BreakdownReport> {
    let filter = BreakdownFilter::from_query(user);
    let mut conn = connect(pool)?;
    db_util::breakdown(&mut conn, roster, country, &filter)
        .map(Json)
        .map_err(|err| score_error(&err))
}

#[get("/breakdown/<country>/users")]
fn breakdown_users(
    pool: &State<PgPool>,
    roster: &State<Roster>,
    country: &str,
) -> ApiResult<Vec<String>> {
    if !roster.contains(country) {
        return Err(not_found_error(format!("unknown country \"{country}\"")));
    }
    let mut conn = connect(pool)?;
    db_util::scored_users(&mut conn, country)
        .map(Json)
        .map_err(|err| score_error(&err))
}

#[catch(401)]
fn unauthorized() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::Unauthorized,
        "missing or unknown session token",
    ))
}

#[catch(404)]
fn not_found() -> Value {
    json!("The requested resource could not be found.")
}

#[catch(422)]
fn unprocessable() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::UnprocessableEntity,
        "the request body could not be parsed",
    ))
}

#[catch(500)]
fn internal() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::Internal,
        "something went wrong on our end",
    ))
}

#[launch]
fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let roster = Roster::from_env().expect("invalid country roster");
    let pool = db_util::create_database_pool().expect("could not create database pool");
    {
        let mut conn = db_util::get_pooled_database_connection(&pool)
            .expect("could not connect to the database");
        db_util::init_schema(&mut conn).expect("could not initialize the schema");
    }

    let prometheus = PrometheusMetrics::new();
    rocket::build()
        .attach(RequestTimingFairing)
        .attach(CorsFairing)
        .attach(prometheus.clone())
        .manage(pool)
        .manage(roster)
        .mount(
            "/",
            routes![
                register,
                get_session,
                countries,
                get_scores,
                post_scores,
                leaderboard,
                breakdown,
                breakdown_users
            ],
        )
        .mount("/metrics", prometheus)
        .register("/", catchers![unauthorized, not_found, unprocessable, internal])
}
