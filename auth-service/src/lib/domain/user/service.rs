use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::federation::profile::ExternalProfile;
use crate::domain::federation::reconciler::IdentityReconciler;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::models::DEFAULT_ROLE;
use crate::domain::user::ports::AuthServicePort;
use crate::domain::user::ports::UserRepository;

/// Authentication domain service.
///
/// Orchestrates the password hasher, the token issuer, and the identity
/// reconciler over an injected repository. Handlers stay thin; everything
/// with a decision in it lives here.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
    token_issuer: Arc<TokenIssuer>,
    reconciler: IdentityReconciler<UR>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            reconciler: IdentityReconciler::new(Arc::clone(&repository)),
            repository,
            password_hasher: PasswordHasher::new(),
            token_issuer,
        }
    }

    fn issue_token(&self, user: &User) -> Result<String, UserError> {
        self.token_issuer
            .issue(&user.token_subject())
            .map_err(|e| UserError::Token(e.to_string()))
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if let Some(existing) = self.repository.find_by_username(&command.username).await? {
            return Err(UserError::UsernameAlreadyExists(
                existing.username.to_string(),
            ));
        }

        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| UserError::Password(e.to_string()))?;

        let user = User {
            id: UserId::new(),
            uuid: Uuid::new_v4(),
            google_id: None,
            email: None,
            username: command.username,
            password_hash: Some(password_hash),
            firstname: command.firstname.filter(|s| !s.is_empty()),
            lastname: command.lastname.filter(|s| !s.is_empty()),
            picture: None,
            role: command
                .role
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            first_login: false,
            created_at: Utc::now(),
        };

        self.repository.create(user).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<(User, String), UserError> {
        // Every failure below collapses into the same InvalidCredentials so
        // responses cannot be used to enumerate usernames.
        let username = Username::new(username.to_string())
            .map_err(|_| UserError::InvalidCredentials)?;

        let user = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        let Some(password_hash) = user.password_hash.as_deref() else {
            // Federation-only account; there is no password to check.
            return Err(UserError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, password_hash) {
            return Err(UserError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    async fn login_federated(
        &self,
        profile: ExternalProfile,
    ) -> Result<(User, String), UserError> {
        let user = self.reconciler.reconcile(&profile).await?;
        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn refresh_token(&self, id: &UserId) -> Result<String, UserError> {
        let user = self.get_user(id).await?;
        self.issue_token(&user)
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
        }
    }

    fn token_issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(
            b"test_secret_key_at_least_32_bytes!",
            "http://auth-service:4000",
            "http://api-gateway:5000",
        ))
    }

    fn service(repository: MockTestUserRepository) -> AuthService<MockTestUserRepository> {
        AuthService::new(Arc::new(repository), token_issuer())
    }

    fn register_command(username: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            firstname: Some("Ana".to_string()),
            lastname: Some("Lopez".to_string()),
            username: Username::new(username.to_string()).unwrap(),
            password: "p1".to_string(),
            role: None,
        }
    }

    fn local_user(username: &str, password: &str) -> User {
        let hash = PasswordHasher::new().hash(password).unwrap();
        User {
            id: UserId::new(),
            uuid: Uuid::new_v4(),
            google_id: None,
            email: None,
            username: Username::new(username.to_string()).unwrap(),
            password_hash: Some(hash),
            firstname: Some("Ana".to_string()),
            lastname: Some("Lopez".to_string()),
            picture: None,
            role: "user".to_string(),
            first_login: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_defaults_role() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "ana"
                    && user.password_hash.as_deref().unwrap().starts_with("$argon2")
                    && user.role == "user"
                    && !user.first_login
                    && user.google_id.is_none()
            })
            .times(1)
            .returning(Ok);

        let result = service(repository).register(register_command("ana")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_username_rejected() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(Some(local_user("ana", "p1"))));
        repository.expect_create().times(0);

        let result = service(repository).register(register_command("ana")).await;
        assert!(matches!(
            result,
            Err(UserError::UsernameAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_register_keeps_supplied_role() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| user.role == "admin")
            .times(1)
            .returning(Ok);

        let mut command = register_command("ana");
        command.role = Some("admin".to_string());

        let result = service(repository).register(command).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_success_issues_valid_token() {
        let mut repository = MockTestUserRepository::new();

        let user = local_user("ana", "p1");
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let issuer = token_issuer();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&issuer));

        let (user, token) = service.login("ana", "p1").await.unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.uuid, user.uuid.to_string());
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        // Unknown username.
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        let unknown = service(repository).login("nadie", "p1").await;

        // Known username, wrong password.
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(Some(local_user("ana", "p1"))));
        let wrong = service(repository).login("ana", "p2").await;

        // Federation-only account without a password.
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(1).returning(|_| {
            let mut user = local_user("ana", "p1");
            user.password_hash = None;
            Ok(Some(user))
        });
        let federated = service(repository).login("ana", "p1").await;

        for result in [unknown, wrong, federated] {
            assert!(matches!(result, Err(UserError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository).get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_refresh_token_reissues_for_existing_subject() {
        let mut repository = MockTestUserRepository::new();

        let user = local_user("ana", "p1");
        let user_id = user.id;
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let issuer = token_issuer();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&issuer));

        let token = service.refresh_token(&user_id).await.unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[tokio::test]
    async fn test_refresh_token_vanished_subject_is_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository).refresh_token(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_login_federated_reconciles_and_issues_token() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_google_id()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_create().times(1).returning(Ok);

        let issuer = token_issuer();
        let service = AuthService::new(Arc::new(repository), Arc::clone(&issuer));

        let profile = ExternalProfile {
            id: "g1".to_string(),
            emails: vec!["Ana@X.com".to_string()],
            display_name: Some("Ana Lopez".to_string()),
            given_name: None,
            family_name: None,
            photos: vec![],
        };

        let (user, token) = service.login_federated(profile).await.unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(user.username.as_str(), "ana");
        assert!(user.first_login);
        assert_eq!(claims.username, "ana");
    }
}
