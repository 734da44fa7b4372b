use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use super::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// The middleware has already vouched for the token; this confirms the
/// subject still exists and returns the current record.
pub async fn validate(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let user = state.auth_service.get_user(&authenticated.user_id).await?;

    Ok(Json(ValidateResponse {
        result: true,
        message: "Token is valid".to_string(),
        user: (&user).into(),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateResponse {
    pub result: bool,
    pub message: String,
    pub user: UserData,
}
