//! Some helper functions for the API.

use douze_common::ScoreError;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::Response;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy)]
pub struct RequestTimingFairing;

#[rocket::async_trait]
impl Fairing for RequestTimingFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request timing",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut rocket::Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started_at = request.local_cache(Instant::now);
        let elapsed = started_at.elapsed();
        let status = response.status().code;

        tracing::info!(
            method = %request.method(),
            path = %request.uri(),
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request Completed"
        );
    }
}

#[derive(Clone, Copy)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS, HEAD",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        response.set_header(Header::new("Access-Control-Max-Age", "86400"));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    NotFound,
    Unauthorized,
    Conflict,
    UnprocessableEntity,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiErrorBody {
    error: ApiErrorKind,
    message: String,
}

impl ApiErrorBody {
    pub fn new(error: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

pub type ApiError = rocket_status::Custom<Json<ApiErrorBody>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: Status, kind: ApiErrorKind, message: impl Into<String>) -> ApiError {
    rocket_status::Custom(status, Json(ApiErrorBody::new(kind, message)))
}

pub fn not_found_error(message: impl Into<String>) -> ApiError {
    api_error(Status::NotFound, ApiErrorKind::NotFound, message)
}

pub fn conflict_error(message: impl Into<String>) -> ApiError {
    api_error(Status::Conflict, ApiErrorKind::Conflict, message)
}

pub fn unprocessable_entity_error(message: impl Into<String>) -> ApiError {
    api_error(
        Status::UnprocessableEntity,
        ApiErrorKind::UnprocessableEntity,
        message,
    )
}

pub fn internal_error(message: impl Into<String>) -> ApiError {
    api_error(Status::InternalServerError, ApiErrorKind::Internal, message)
}

/// Map an engine error onto the wire error contract.
pub fn score_error(err: &ScoreError) -> ApiError {
    match err {
        ScoreError::NameTaken(_) => conflict_error(err.to_string()),
        ScoreError::EmptyName | ScoreError::CategoryOutOfRange { .. } => {
            unprocessable_entity_error(err.to_string())
        }
        ScoreError::UnknownCountry(_) => not_found_error(err.to_string()),
        ScoreError::Database(_) | ScoreError::Conversion(_) => internal_error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use douze_common::Category;

    #[test]
    fn error_body_serializes_with_snake_case_kind() {
        let body = ApiErrorBody::new(ApiErrorKind::UnprocessableEntity, "song score 13 is bad");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"error":"unprocessable_entity","message":"song score 13 is bad"}"#
        );
    }

    #[test]
    fn score_errors_map_to_the_right_statuses() {
        let cases = [
            (ScoreError::NameTaken("Alex".to_string()), Status::Conflict),
            (ScoreError::EmptyName, Status::UnprocessableEntity),
            (
                ScoreError::CategoryOutOfRange {
                    category: Category::Song,
                    value: 13,
                },
                Status::UnprocessableEntity,
            ),
            (
                ScoreError::UnknownCountry("Atlantis".to_string()),
                Status::NotFound,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(score_error(&err).0, expected, "wrong status for {err:?}");
        }
    }
}
