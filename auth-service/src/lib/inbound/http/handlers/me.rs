use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use super::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn me(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.auth_service.get_user(&authenticated.user_id).await?;

    Ok(Json(MeResponse {
        result: true,
        user: (&user).into(),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponse {
    pub result: bool,
    pub user: UserData,
}
