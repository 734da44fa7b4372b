use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use url::Url;

use super::ApiError;
use crate::inbound::http::router::AppState;

/// Entry into the provider's consent flow. No session is established; the
/// callback carries everything needed.
pub async fn google_login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.identity_provider.authorization_url())
}

/// Provider callback: exchange the code, reconcile the identity, issue a
/// token, and hand the user agent back to the front-end (or answer with
/// JSON when no front-end URL is configured).
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let code = match (params.code, params.error) {
        (Some(code), None) if !code.is_empty() => code,
        (_, error) => {
            tracing::warn!(error = ?error, "Provider callback without usable code");
            return Ok(Redirect::temporary("/auth/google/failure").into_response());
        }
    };

    let profile = match state.identity_provider.fetch_profile(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Provider code exchange failed");
            return Ok(Redirect::temporary("/auth/google/failure").into_response());
        }
    };

    let (_user, token) = state.auth_service.login_federated(profile).await?;

    match &state.frontend_success_url {
        Some(redirect_url) => {
            let target = append_token(redirect_url, &token);
            Ok(Redirect::temporary(&target).into_response())
        }
        None => Ok(Json(CallbackResponse {
            result: true,
            message: "Google login successful".to_string(),
            token,
        })
        .into_response()),
    }
}

pub async fn google_failure() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "result": false, "message": "Google authentication failed" })),
    )
        .into_response()
}

/// Append `token=<token>` to a redirect URL.
///
/// Front-end routers live behind fragments (`/#/login`), so a token query
/// parameter must land inside the fragment when one exists; otherwise it
/// belongs in the real query string.
fn append_token(redirect_url: &str, token: &str) -> String {
    if let Some((base, fragment)) = redirect_url.split_once('#') {
        let separator = if fragment.contains('?') { '&' } else { '?' };
        return format!("{base}#{fragment}{separator}token={token}");
    }

    match Url::parse(redirect_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("token", token);
            url.to_string()
        }
        Err(_) => {
            let separator = if redirect_url.contains('?') { '&' } else { '?' };
            format!("{redirect_url}{separator}token={token}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackResponse {
    pub result: bool,
    pub message: String,
    pub token: String,
}
