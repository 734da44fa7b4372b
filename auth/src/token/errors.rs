use thiserror::Error;

/// Error type for token operations.
///
/// Validation failures are exactly three kinds and are never conflated:
/// an expired token must not surface as an invalid one, and key/crypto
/// failures must not surface as either.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Token processing failed: {0}")]
    Internal(String),
}
