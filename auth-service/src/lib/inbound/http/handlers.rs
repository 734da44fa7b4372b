use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::domain::federation::errors::FederationError;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;

pub mod google;
pub mod login;
pub mod me;
pub mod refresh;
pub mod register;
pub mod validate;

/// Wire-level error. Every failure leaving this service is one of these,
/// rendered as `{result: false, message}`; internal errors additionally carry
/// an `error` diagnostic string for operators (never hashes or key material).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal { message: String, detail: String },
}

impl ApiError {
    fn internal(message: &str, detail: String) -> Self {
        Self::Internal {
            message: message.to_string(),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "result": false, "message": message })),
            )
                .into_response(),
            ApiError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "result": false, "message": message })),
            )
                .into_response(),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "result": false, "message": message })),
            )
                .into_response(),
            ApiError::Internal { message, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "result": false, "message": message, "error": detail })),
            )
                .into_response(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            UserError::UsernameAlreadyExists(_) => {
                ApiError::BadRequest("User already exists".to_string())
            }
            // Deliberately the same body for every bad-credential cause.
            UserError::InvalidCredentials => {
                ApiError::BadRequest("Invalid credentials".to_string())
            }
            UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidUserId(_)
            | UserError::EmailAlreadyExists(_)
            | UserError::GoogleIdAlreadyExists(_) => ApiError::BadRequest(err.to_string()),
            UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Request failed with internal error");
                ApiError::internal("Internal server error", err.to_string())
            }
        }
    }
}

impl From<FederationError> for ApiError {
    fn from(err: FederationError) -> Self {
        // Provider internals never reach clients.
        tracing::warn!(error = %err, "Upstream identity provider failure");
        ApiError::Unauthorized("Google authentication failed".to_string())
    }
}

/// Public projection of a user record; password hash and internal id stay out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub uuid: String,
    pub username: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub role: String,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            uuid: user.uuid.to_string(),
            username: user.username.to_string(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            role: user.role.clone(),
        }
    }
}
