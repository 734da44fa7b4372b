use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenIssuer;
use auth_service::domain::federation::errors::FederationError;
use auth_service::domain::federation::ports::IdentityProviderPort;
use auth_service::domain::federation::profile::ExternalProfile;
use auth_service::domain::user::errors::UserError;
use auth_service::domain::user::models::User;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::models::Username;
use auth_service::domain::user::ports::UserRepository;
use auth_service::domain::user::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use tokio::sync::RwLock;

pub const JWT_SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";
pub const JWT_ISSUER: &str = "http://auth-service:4000";
pub const JWT_AUDIENCE: &str = "http://api-gateway:5000";

/// Test application running the real router on a random port, backed by an
/// in-memory store and a stub identity provider so no Postgres or Google
/// round trip is needed.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub identity_provider: Arc<StubIdentityProvider>,
    pub token_issuer: Arc<TokenIssuer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(None).await
    }

    pub async fn spawn_with(frontend_success_url: Option<String>) -> Self {
        let repository = Arc::new(InMemoryUserRepository::new());
        let token_issuer = Arc::new(TokenIssuer::new(JWT_SECRET, JWT_ISSUER, JWT_AUDIENCE));
        let identity_provider = Arc::new(StubIdentityProvider::new(ana_profile()));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            Arc::clone(&token_issuer),
        ));

        let state = AppState {
            auth_service,
            token_issuer: Arc::clone(&token_issuer),
            identity_provider: Arc::clone(&identity_provider) as _,
            frontend_success_url,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server crashed");
        });

        // Redirects stay visible to assertions.
        let api_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build client");

        Self {
            address,
            api_client,
            repository,
            identity_provider,
            token_issuer,
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }
}

/// The Ana Lopez profile from the federated-login scenario.
pub fn ana_profile() -> ExternalProfile {
    ExternalProfile {
        id: "g1".to_string(),
        emails: vec!["Ana@X.com".to_string()],
        display_name: Some("Ana Lopez".to_string()),
        given_name: None,
        family_name: None,
        photos: vec![],
    }
}

/// Identity provider stub: hands out a canned profile for any code except
/// `provider-error`, which simulates a failed exchange.
pub struct StubIdentityProvider {
    profile: RwLock<ExternalProfile>,
}

impl StubIdentityProvider {
    pub fn new(profile: ExternalProfile) -> Self {
        Self {
            profile: RwLock::new(profile),
        }
    }

    pub async fn set_profile(&self, profile: ExternalProfile) {
        *self.profile.write().await = profile;
    }
}

#[async_trait]
impl IdentityProviderPort for StubIdentityProvider {
    fn authorization_url(&self) -> String {
        "https://accounts.google.com/o/oauth2/v2/auth?client_id=stub&scope=profile+email"
            .to_string()
    }

    async fn fetch_profile(&self, code: &str) -> Result<ExternalProfile, FederationError> {
        if code == "provider-error" {
            return Err(FederationError::Exchange("stub rejection".to_string()));
        }
        Ok(self.profile.read().await.clone())
    }
}

/// In-memory user store enforcing the same uniqueness contract as Postgres.
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    fn conflicts(existing: &User, candidate: &User) -> Option<UserError> {
        if existing.username == candidate.username {
            return Some(UserError::UsernameAlreadyExists(
                candidate.username.to_string(),
            ));
        }
        if existing.email.is_some() && existing.email == candidate.email {
            return Some(UserError::EmailAlreadyExists(
                candidate
                    .email
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
            ));
        }
        if existing.google_id.is_some() && existing.google_id == candidate.google_id {
            return Some(UserError::GoogleIdAlreadyExists(
                candidate.google_id.clone().unwrap_or_default(),
            ));
        }
        None
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        for existing in users.iter() {
            if let Some(conflict) = Self::conflicts(existing, &user) {
                return Err(conflict);
            }
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == *username)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email.as_ref().map(|e| e.as_str()) == Some(email))
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        for existing in users.iter().filter(|u| u.id != user.id) {
            if let Some(conflict) = Self::conflicts(existing, &user) {
                return Err(conflict);
            }
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            }
            None => Err(UserError::NotFound(user.id.to_string())),
        }
    }
}
