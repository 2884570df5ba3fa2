//! A command-line client for the douze party scoreboard.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use douze_common::{CategoryScores, client_api, scoring};
use log::debug;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The base API URL to connect to
    #[arg(long, default_value = "http://127.0.0.1:8000", env = "DOUZE_API_BASE")]
    api_base: String,

    /// The session token handed out by `register`
    #[arg(long, env = "DOUZE_TOKEN")]
    token: Option<String>,

    /// Print raw JSON instead of plain tables
    #[arg(long, env = "DOUZE_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a display name and print the session token
    Register { name: String },
    /// Print the configured country list in running order
    Countries,
    /// Print the display name behind the current token
    Whoami,
    /// Show your current ratings for a country
    Scores { country: String },
    /// Submit ratings (0-12 each) for a country, overwriting earlier ones
    Submit {
        country: String,
        #[arg(long)]
        song: u8,
        #[arg(long)]
        vocal: u8,
        #[arg(long)]
        staging: u8,
        #[arg(long)]
        camp: u8,
    },
    /// Show the leaderboard across all users
    Leaderboard,
    /// Show the per-category breakdown for a country
    Breakdown {
        country: String,
        /// Filter to a single user's scores
        #[arg(long)]
        user: Option<String>,
    },
}

fn require_token(cli: &Cli) -> Result<&str> {
    cli.token
        .as_deref()
        .context("no session token; run `douze register <name>` or set DOUZE_TOKEN")
}

fn print_category_line(label: &str, song: u64, vocal: u64, staging: u64, camp: u64) {
    println!(
        "  {label:<14} song {song:>3}   vocal {vocal:>3}   staging {staging:>3}   camp {camp:>3}"
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("talking to {}", cli.api_base);

    match &cli.command {
        Command::Register { name } => {
            let credential = client_api::register(&cli.api_base, name)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&credential)?);
            } else {
                println!("Registered as {}.", credential.user_id);
                println!("Session token: {}", credential.token);
                println!("Keep it for later commands, e.g.:");
                println!("  export DOUZE_TOKEN={}", credential.token);
            }
        }
        Command::Countries => {
            let countries = client_api::get_countries(&cli.api_base)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&countries)?);
            } else {
                for (position, country) in countries.iter().enumerate() {
                    println!("{:>2}. {country}", position + 1);
                }
            }
        }
        Command::Whoami => {
            let user_id = client_api::whoami(&cli.api_base, require_token(&cli)?)?;
            if cli.json {
                println!("{}", serde_json::json!({ "user_id": user_id }));
            } else {
                println!("{user_id}");
            }
        }
        Command::Scores { country } => {
            let scores = client_api::get_scores(&cli.api_base, require_token(&cli)?, country)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&scores)?);
            } else {
                println!("Your scores for {country} (total {}):", scores.total());
                print_category_line(
                    "you",
                    scores.song.into(),
                    scores.vocal.into(),
                    scores.staging.into(),
                    scores.camp.into(),
                );
            }
        }
        Command::Submit {
            country,
            song,
            vocal,
            staging,
            camp,
        } => {
            let scores = CategoryScores {
                song: *song,
                vocal: *vocal,
                staging: *staging,
                camp: *camp,
            };
            // The server checks again, but a local check gives a nicer message
            scoring::validate(&scores)?;
            let record =
                client_api::submit_scores(&cli.api_base, require_token(&cli)?, country, &scores)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!(
                    "Stored your scores for {}: total {}.",
                    record.country, record.total_score
                );
            }
        }
        Command::Leaderboard => {
            let entries = client_api::get_leaderboard(&cli.api_base)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (position, entry) in entries.iter().enumerate() {
                    println!(
                        "{:>3}. {:<24} {:>5}",
                        position + 1,
                        entry.country,
                        entry.total_score
                    );
                }
            }
        }
        Command::Breakdown { country, user } => {
            let report = client_api::get_breakdown(&cli.api_base, country, user.as_deref())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Score breakdown for {}:", report.country);
                print_category_line(
                    "everyone",
                    report.totals.song,
                    report.totals.vocal,
                    report.totals.staging,
                    report.totals.camp,
                );
                if let Some(user_part) = &report.user {
                    print_category_line(
                        &user_part.user_id,
                        user_part.scores.song.into(),
                        user_part.scores.vocal.into(),
                        user_part.scores.staging.into(),
                        user_part.scores.camp.into(),
                    );
                    print_category_line(
                        "everyone else",
                        user_part.everyone_else.song,
                        user_part.everyone_else.vocal,
                        user_part.everyone_else.staging,
                        user_part.everyone_else.camp,
                    );
                } else {
                    let scorers = client_api::get_scored_users(&cli.api_base, country)?;
                    if scorers.is_empty() {
                        println!("  nobody has scored {country} yet");
                    } else {
                        println!("  scored by: {}", scorers.join(", "));
                    }
                }
            }
        }
    }

    Ok(())
}
