use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::UserData;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let username = Username::new(body.username).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let command = RegisterUserCommand {
        firstname: body.firstname,
        lastname: body.lastname,
        username,
        password: body.password,
        role: body.role,
    };

    let user = state.auth_service.register(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            result: true,
            message: "User created successfully".to_string(),
            user: (&user).into(),
        }),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Accepted as supplied; defaults to "user" when absent.
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponse {
    pub result: bool,
    pub message: String,
    pub user: UserData,
}
