use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::UserIdError;
use crate::domain::user::errors::UsernameError;

/// Role assigned to users that do not request one explicitly.
pub const DEFAULT_ROLE: &str = "user";

/// User aggregate entity.
///
/// Holds both a local credential (optional password hash) and a federated
/// identity link (optional google id). After creation the record is
/// additive-only: reconciliation fills gaps but never overwrites a populated
/// field.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal identifier, assigned at creation, immutable.
    pub id: UserId,
    /// Public reference identifier carried in token claims.
    pub uuid: Uuid,
    /// External provider identity, immutable once set.
    pub google_id: Option<String>,
    /// Lower-cased, unique when present.
    pub email: Option<EmailAddress>,
    pub username: Username,
    /// Absent for federation-only accounts.
    pub password_hash: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub picture: Option<String>,
    pub role: String,
    /// True only when the record was created by a federated login.
    pub first_login: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Projection of this user into token claims input.
    pub fn token_subject(&self) -> auth::TokenSubject {
        auth::TokenSubject {
            id: self.id.to_string(),
            uuid: self.uuid.to_string(),
            username: self.username.to_string(),
            role: self.role.clone(),
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Usernames come from two places: user input at registration, and derivation
/// from an email local-part or `google_<id>` at federated creation. The
/// charset therefore admits dots alongside the usual alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty
    /// * `TooLong` - Username longer than 64 characters
    /// * `InvalidCharacters` - Contains characters outside alphanumeric, `.`, `_`, `-`
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.is_empty() {
            return Err(UsernameError::Empty);
        }
        if username.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: username.len(),
            });
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '-')
        {
            return Err(UsernameError::InvalidCharacters);
        }
        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Stored lower-cased; validated with an RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, lower-cased email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `@`, used for username derivation.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a local user.
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Username,
    pub password: String,
    /// Accepted as supplied; defaults to [`DEFAULT_ROLE`] when absent.
    pub role: Option<String>,
}
