use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::google::google_callback;
use super::handlers::google::google_failure;
use super::handlers::google::google_login;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::validate::validate;
use super::middleware::authenticate as auth_middleware;
use crate::domain::federation::ports::IdentityProviderPort;
use crate::domain::user::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub token_issuer: Arc<TokenIssuer>,
    pub identity_provider: Arc<dyn IdentityProviderPort>,
    pub frontend_success_url: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/auth/google", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/auth/google/failure", get(google_failure));

    let protected_routes = Router::new()
        .route("/api/auth/validate", get(validate))
        .route("/api/auth/me", get(me))
        .route("/api/auth/refresh", post(refresh))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
