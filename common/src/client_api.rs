//! Blocking client-server connection utilities for the CLI.
//!
//! Failures are surfaced to the caller as-is; nothing here retries. A
//! failed submission leaves the server state unchanged and the user
//! decides what to do next.

use crate::{
    BreakdownReport, CLIENT_REQUEST_TIMEOUT_SECS, CLIENT_VERSION, CategoryScores, Credential,
    LeaderboardEntry, ScoreRecord, TOKEN_HEADER,
};
use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct RegisterRequest<'a> {
    user_id: &'a str,
}

#[derive(Deserialize)]
struct SessionInfo {
    user_id: String,
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(CLIENT_REQUEST_TIMEOUT_SECS))
        .user_agent(format!("douze_cli/{CLIENT_VERSION}"))
        .build()
        .context("Failed to build HTTP client")
}

/// Map any non-2xx response to a readable error carrying the server's
/// message.
fn check_status(response: Response) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status();
        let msg = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(anyhow!("Server returned an error ({status}): {msg}"));
    }
    Ok(response)
}

/// Register a display name and receive the session credential.
pub fn register(api_base: &str, name: &str) -> Result<Credential> {
    let url = format!("{api_base}/register");
    let response = build_client()?
        .post(&url)
        .json(&RegisterRequest { user_id: name })
        .send()
        .context("Failed to reach the server")?;

    check_status(response)?
        .json::<Credential>()
        .context("Failed to deserialize registration response")
}

/// Resolve the current token back to its display name.
pub fn whoami(api_base: &str, session_token: &str) -> Result<String> {
    let url = format!("{api_base}/session");
    let response = build_client()?
        .get(&url)
        .header(TOKEN_HEADER, session_token)
        .send()
        .context("Failed to reach the server")?;

    let info = check_status(response)?
        .json::<SessionInfo>()
        .context("Failed to deserialize session response")?;
    Ok(info.user_id)
}

/// The configured country roster, in display order.
pub fn get_countries(api_base: &str) -> Result<Vec<String>> {
    let url = format!("{api_base}/countries");
    let response = build_client()?
        .get(&url)
        .send()
        .context("Failed to reach the server")?;

    check_status(response)?
        .json::<Vec<String>>()
        .context("Failed to deserialize country list")
}

/// The caller's current ratings for a country (zeros until they score it).
pub fn get_scores(api_base: &str, session_token: &str, country: &str) -> Result<CategoryScores> {
    let url = format!("{api_base}/scores/{country}");
    let response = build_client()?
        .get(&url)
        .header(TOKEN_HEADER, session_token)
        .send()
        .context("Failed to reach the server")?;

    check_status(response)?
        .json::<CategoryScores>()
        .context("Failed to deserialize scores")
}

/// Submit ratings for a country, overwriting any earlier submission.
pub fn submit_scores(
    api_base: &str,
    session_token: &str,
    country: &str,
    scores: &CategoryScores,
) -> Result<ScoreRecord> {
    let url = format!("{api_base}/scores/{country}");
    let response = build_client()?
        .post(&url)
        .header(TOKEN_HEADER, session_token)
        .json(scores)
        .send()
        .context("Failed to reach the server")?;

    check_status(response)?
        .json::<ScoreRecord>()
        .context("Failed to deserialize stored score")
}

/// The full leaderboard, one entry per configured country.
pub fn get_leaderboard(api_base: &str) -> Result<Vec<LeaderboardEntry>> {
    let url = format!("{api_base}/leaderboard");
    let response = build_client()?
        .get(&url)
        .send()
        .context("Failed to reach the server")?;

    check_status(response)?
        .json::<Vec<LeaderboardEntry>>()
        .context("Failed to deserialize leaderboard")
}

/// Per-category breakdown for a country, optionally filtered to one user.
pub fn get_breakdown(api_base: &str, country: &str, user: Option<&str>) -> Result<BreakdownReport> {
    let url = format!("{api_base}/breakdown/{country}");
    let mut request = build_client()?.get(&url);
    if let Some(name) = user {
        request = request.query(&[("user", name)]);
    }
    let response = request.send().context("Failed to reach the server")?;

    check_status(response)?
        .json::<BreakdownReport>()
        .context("Failed to deserialize breakdown")
}

/// The users who have scored a country so far.
pub fn get_scored_users(api_base: &str, country: &str) -> Result<Vec<String>> {
    let url = format!("{api_base}/breakdown/{country}/users");
    let response = build_client()?
        .get(&url)
        .send()
        .context("Failed to reach the server")?;

    check_status(response)?
        .json::<Vec<String>>()
        .context("Failed to deserialize user list")
}
