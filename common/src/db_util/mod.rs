//! Interfaces between the application code and database.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use std::env;

pub mod conversions;
mod scores;
mod users;

pub use scores::{breakdown, get_scores, leaderboard, scored_users, submit_scores};
pub use users::{get_user_by_token, register_user, user_exists};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Read the connection string from the environment, loading a `.env` file
/// first if one is present.
fn get_database_url() -> Result<String, String> {
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())
}

/// One-off connection for scripts and tooling.
pub fn get_database_connection() -> Result<PgConnection, String> {
    let database_url = get_database_url()?;
    PgConnection::establish(&database_url).map_err(|err| err.to_string())
}

/// Build the shared connection pool the api hands out per request.
pub fn create_database_pool() -> Result<PgPool, String> {
    let database_url = get_database_url()?;
    Pool::builder()
        .build(ConnectionManager::new(database_url))
        .map_err(|err| err.to_string())
}

pub fn get_pooled_database_connection(pool: &PgPool) -> Result<PgPooledConn, PoolError> {
    pool.get()
}

/// Create the two tables if they do not exist yet, so a fresh database
/// works out of the box.
///
/// Note there is deliberately no foreign key from `scores.user_id` to
/// `users.user_id`: score writes only happen for a session-resolved user,
/// so the application upholds that invariant, not the schema.
pub fn init_schema(conn: &mut PgConnection) -> QueryResult<()> {
    conn.batch_execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            token TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS scores (
            user_id TEXT NOT NULL,
            country TEXT NOT NULL,
            total_score INTEGER NOT NULL,
            song INTEGER NOT NULL,
            vocal INTEGER NOT NULL,
            staging INTEGER NOT NULL,
            camp INTEGER NOT NULL,
            PRIMARY KEY (user_id, country)
        );
        "#,
    )
}
