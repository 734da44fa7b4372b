use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity carried into a token at issuance.
///
/// A deliberately small projection of the user record: the internal id, the
/// public reference uuid, the username, and the flat role string. Nothing
/// else from the store leaks into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: String,
    pub uuid: String,
    pub username: String,
    pub role: String,
}

/// Signed session token payload.
///
/// `sub` holds the internal user id; `uuid` the public reference identifier.
/// Issuer and audience are fixed per deployment and validated on decode, so a
/// token minted here cannot be replayed against an unrelated service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: internal user id
    pub sub: String,

    /// Public reference identifier
    pub uuid: String,

    pub username: String,

    pub role: String,

    /// Issuer, fixed per deployment
    pub iss: String,

    /// Audience, fixed per deployment
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a subject, expiring `lifetime` from now.
    pub fn for_subject(
        subject: &TokenSubject,
        issuer: &str,
        audience: &str,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.id.clone(),
            uuid: subject.uuid.clone(),
            username: subject.username.clone(),
            role: subject.role.clone(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    /// Project the claims back into a subject, e.g. for reissuing a token.
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.sub.clone(),
            uuid: self.uuid.clone(),
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}
