use async_trait::async_trait;

use crate::domain::federation::profile::ExternalProfile;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a local user with a hashed password.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - username is taken
    /// * `Password` - hashing failed
    /// * `DatabaseError` - store operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Authenticate a local user and issue a session token.
    ///
    /// Unknown username, wrong password, and federation-only accounts all
    /// fail with the same `InvalidCredentials`.
    ///
    /// # Returns
    /// The user and a freshly issued token
    async fn login(&self, username: &str, password: &str) -> Result<(User, String), UserError>;

    /// Reconcile a verified external profile into a user record and issue a
    /// session token for it.
    async fn login_federated(
        &self,
        profile: ExternalProfile,
    ) -> Result<(User, String), UserError>;

    /// Retrieve user by internal identifier.
    ///
    /// # Errors
    /// * `NotFound` - user does not exist
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Issue a fresh token for an already-authenticated subject.
    ///
    /// # Errors
    /// * `NotFound` - subject vanished since the presented token was issued
    async fn refresh_token(&self, id: &UserId) -> Result<String, UserError>;
}

/// Persistence operations for the user aggregate.
///
/// Uniqueness of `username`, `email`, and `google_id` is enforced here; the
/// corresponding `*AlreadyExists` errors are the contract for violations.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` / `EmailAlreadyExists` / `GoogleIdAlreadyExists`
    /// * `DatabaseError` - store operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Persist changes to an existing user.
    ///
    /// # Errors
    /// * `NotFound` - user does not exist
    /// * `UsernameAlreadyExists` / `EmailAlreadyExists` / `GoogleIdAlreadyExists`
    /// * `DatabaseError` - store operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;
}
