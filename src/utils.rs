use chrono::{NaiveDateTime, SecondsFormat};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{Responder, Response};
use rocket::serde::json::Json;
use serde::Serializer;
use serde_json::Value;

use crate::types::ApiError;

pub fn try_respond(
    req: &Request,
    json: &Value,
    status: Status,
) -> Result<Response<'static>, Status> {
    Json(json.clone())
        .respond_to(req)
        .and_then(|resp| Response::build_from(resp).status(status).ok())
}

/// Timestamps are stored without a zone and are always UTC.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = date.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Parses a path segment as a row id. Only plain non-negative integers that
/// fit the id column are accepted.
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id >= 0 && !raw.starts_with('+') => Ok(id),
        _ => Err(ApiError::bad_request()),
    }
}

/// Returns the field only if it is present and not blank.
pub fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
