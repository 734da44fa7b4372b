use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Reissues a 15-minute token from a still-valid one. There is no rotation
/// or revocation list; the subject is re-fetched so a deleted account gets
/// 404 instead of a fresh session.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = state
        .auth_service
        .refresh_token(&authenticated.user_id)
        .await?;

    Ok(Json(RefreshResponse {
        result: true,
        message: "Token renewed".to_string(),
        token,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponse {
    pub result: bool,
    pub message: String,
    pub token: String,
}
