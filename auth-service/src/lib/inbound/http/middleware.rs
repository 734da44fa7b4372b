use auth::Claims;
use auth::TokenError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

/// Extension type carrying the authenticated identity into handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub claims: Claims,
}

/// Session middleware guarding protected routes.
///
/// Walks a request from bearer extraction through validation and either
/// attaches the decoded claims to the request or short-circuits. The three
/// rejection reasons (missing / invalid / expired) are never conflated, and
/// key failures surface as 500 rather than a misleading 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&req)?;

    let claims = state.token_issuer.validate(token).map_err(|e| match e {
        TokenError::Expired => {
            tracing::warn!("Rejected expired token");
            reject(StatusCode::UNAUTHORIZED, "Token expired")
        }
        TokenError::Invalid(reason) => {
            tracing::warn!(reason = %reason, "Rejected invalid token");
            reject(StatusCode::UNAUTHORIZED, "Invalid token")
        }
        TokenError::Internal(reason) => {
            tracing::error!(reason = %reason, "Token validation failed internally");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Token validation error")
        }
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a valid user id");
        reject(StatusCode::UNAUTHORIZED, "Invalid token")
    })?;

    req.extensions_mut()
        .insert(AuthenticatedUser { user_id, claims });

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Token not provided"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid token"))?;

    // The Bearer prefix is conventional but optional; a bare token is accepted.
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();

    if token.is_empty() {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid token"));
    }

    Ok(token)
}

fn reject(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "result": false, "message": message })),
    )
        .into_response()
}
