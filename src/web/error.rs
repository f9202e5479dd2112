use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::application::AppError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A user-visible form error. Served with HTTP 200 and an `error` field,
    /// the way the rendered form pages surfaced validation failures.
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

#[derive(Serialize)]
struct FormErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Form(msg) => {
                return (StatusCode::OK, Json(FormErrorBody { error: msg })).into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::UserNotFound(_) => ApiError::NotFound,
            AppError::Database(e) => {
                tracing::error!(error = %e, "unexpected application failure");
                ApiError::Internal("internal error".to_string())
            }
            // Everything else is bad form input
            e => ApiError::Form(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
