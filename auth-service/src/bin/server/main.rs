use std::sync::Arc;

use auth::TokenIssuer;
use auth_service::config::Config;
use auth_service::domain::user::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::outbound::oauth::GoogleIdentityProvider;
use auth_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_issuer = %config.jwt.issuer,
        jwt_audience = %config.jwt.audience,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_issuer = Arc::new(TokenIssuer::new(
        config.jwt.secret.as_bytes(),
        &config.jwt.issuer,
        &config.jwt.audience,
    ));
    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let identity_provider = Arc::new(GoogleIdentityProvider::new(&config.google)?);
    let auth_service = Arc::new(AuthService::new(repository, Arc::clone(&token_issuer)));

    let state = AppState {
        auth_service,
        token_issuer,
        identity_provider,
        frontend_success_url: config.google.frontend_success_url.clone(),
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;

    Ok(())
}
