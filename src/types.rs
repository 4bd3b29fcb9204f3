use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::{self, Json};
use rocket::tokio::task::JoinError;
use serde_json::Value;
use std::borrow::Cow;

use crate::utils::try_respond;

pub const BAD_REQUEST: &str = "Bad request";
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// Turns a loosely-typed request body into the value a handler works with,
/// rejecting it before any query runs.
pub trait Validate
where
    Self: Sized,
{
    type Valid;
    fn validate(self) -> Result<Self::Valid, ApiError>;
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(Cow<'static, str>),
    NotFound(Cow<'static, str>),
    Diesel(DieselError),
    Pool(r2d2::Error),
    Task(JoinError),
}

impl ApiError {
    pub fn bad_request() -> Self {
        ApiError::BadRequest(Cow::Borrowed(BAD_REQUEST))
    }

    pub fn not_found(msg: &'static str) -> Self {
        ApiError::NotFound(Cow::Borrowed(msg))
    }

    /// Maps the error to the status code and message the caller sees.
    /// Storage errors are only ever reported by kind, never by their text.
    pub fn status_and_message(&self) -> (Status, Cow<'static, str>) {
        match self {
            ApiError::BadRequest(msg) => (Status::BadRequest, msg.clone()),
            ApiError::NotFound(msg) => (Status::NotFound, msg.clone()),
            ApiError::Diesel(error) => match error {
                DieselError::NotFound => (Status::NotFound, Cow::Borrowed("Not found")),
                DieselError::DatabaseError(kind, info) => match kind {
                    DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::UniqueViolation => {
                        (Status::BadRequest, Cow::Borrowed(BAD_REQUEST))
                    }
                    // 22P02, invalid_text_representation
                    DatabaseErrorKind::Unknown
                        if info.message().starts_with("invalid input syntax") =>
                    {
                        (Status::BadRequest, Cow::Borrowed(BAD_REQUEST))
                    }
                    // 22003, numeric_value_out_of_range
                    DatabaseErrorKind::Unknown if is_out_of_range(info.message()) => {
                        (Status::BadRequest, Cow::Borrowed(BAD_REQUEST))
                    }
                    _ => internal(),
                },
                _ => internal(),
            },
            ApiError::Pool(_) | ApiError::Task(_) => internal(),
        }
    }
}

fn is_out_of_range(message: &str) -> bool {
    message.ends_with("out of range")
        || message.contains("is out of range for type")
        || message.starts_with("numeric field overflow")
}

fn internal() -> (Status, Cow<'static, str>) {
    (Status::InternalServerError, Cow::Borrowed(INTERNAL_ERROR))
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> ApiError {
        ApiError::Task(err)
    }
}

impl<'a> From<json::Error<'a>> for ApiError {
    fn from(err: json::Error<'a>) -> ApiError {
        log::debug!("rejected request body: {:?}", err);
        ApiError::bad_request()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// A JSON request body whose parse failure is reported by the handler rather
/// than by Rocket's catchers.
pub type JsonBody<'r, T> = Result<Json<T>, json::Error<'r>>;

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, msg) = self.status_and_message();
        if status == Status::InternalServerError {
            log::error!("{} {} failed: {:?}", req.method(), req.uri(), self);
        }
        let body: Value = json!({ "msg": msg });
        try_respond(req, &body, status)
    }
}
