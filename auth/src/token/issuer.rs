use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::errors::TokenError;

/// Session token lifetime. Tokens are stateless, so this is the only thing
/// bounding how long a stolen token stays usable.
pub const TOKEN_LIFETIME_MINUTES: i64 = 15;

/// Issues and validates signed session tokens.
///
/// The algorithm is pinned to HS256 on both encode and decode, which closes
/// algorithm-substitution tricks (e.g. a token re-signed as `none`). Issuer
/// and audience are fixed at construction and enforced on every decode.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    /// Create a token issuer bound to a deployment.
    ///
    /// # Arguments
    /// * `secret` - HMAC key, at least 32 bytes for HS256
    /// * `issuer` - value stamped into and required from the `iss` claim
    /// * `audience` - value stamped into and required from the `aud` claim
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Issue a fresh token for a subject, expiring in 15 minutes.
    ///
    /// # Errors
    /// * `Internal` - signing failed
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        let claims = Claims::for_subject(
            subject,
            &self.issuer,
            &self.audience,
            Duration::minutes(TOKEN_LIFETIME_MINUTES),
        );
        self.sign(&claims)
    }

    /// Sign an explicit claims payload.
    ///
    /// `issue` is the normal path; this exists for callers that need control
    /// over the timestamps (expiry fixtures in tests, clock injection).
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::Internal(e.to_string()))
    }

    /// Validate signature, expiry, issuer, and audience; return the claims.
    ///
    /// # Errors
    /// * `Expired` - signature is fine but `exp` has passed
    /// * `Invalid` - malformed token, bad signature, or wrong issuer/audience
    /// * `Internal` - key material or crypto backend failure
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        // No leeway: a token is expired the second its exp passes.
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::Crypto(_) | ErrorKind::InvalidKeyFormat => {
                        TokenError::Internal(e.to_string())
                    }
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Reissue a token for the subject of already-validated claims.
    ///
    /// The caller is responsible for having validated the presented token
    /// first; there is no revocation list, so this only extends a session
    /// that is still live.
    pub fn refresh(&self, claims: &Claims) -> Result<String, TokenError> {
        self.issue(&claims.subject())
    }
}
