use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::platform::PlatformError;

/// JSON body for every failing route: `{message}` plus the platform's own
/// error text when one exists.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Route failure carrying the status mapping the API promises: platform
/// rejections during registration and field writes map to 400, login and
/// token failures to 401, role mismatches to 403.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("user creation failed: {0}")]
    Registration(PlatformError),

    #[error("login failed: {0}")]
    Login(PlatformError),

    #[error("login failed: no user record matches the supplied email")]
    UnknownUser,

    #[error("field write failed: {0}")]
    FieldWrite(PlatformError),

    #[error("missing or malformed Authorization header")]
    MissingBearer,

    #[error("token verification failed: {0}")]
    InvalidToken(PlatformError),

    #[error("{0} role required")]
    RoleRequired(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            ApiError::Registration(e) => (
                StatusCode::BAD_REQUEST,
                "User creation failed".to_string(),
                Some(e.to_string()),
            ),
            ApiError::Login(e) => (
                StatusCode::UNAUTHORIZED,
                "Login failed".to_string(),
                Some(e.to_string()),
            ),
            ApiError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "Login failed".to_string(),
                Some("no user record matches the supplied email".to_string()),
            ),
            ApiError::FieldWrite(e) => (
                StatusCode::BAD_REQUEST,
                "Error adding field".to_string(),
                Some(e.to_string()),
            ),
            ApiError::MissingBearer => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid Authorization header".to_string(),
                None,
            ),
            ApiError::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
                None,
            ),
            ApiError::RoleRequired(role) => (
                StatusCode::FORBIDDEN,
                format!("Forbidden: {role} role required"),
                None,
            ),
        };
        (status, Json(ErrorBody { message, error })).into_response()
    }
}
