use thiserror::Error;

/// Error for external identity provider interactions.
///
/// Detail strings are for operator logs; the HTTP boundary reduces all of
/// these to one generic upstream-identity failure so provider internals never
/// leak to clients.
#[derive(Debug, Clone, Error)]
pub enum FederationError {
    #[error("Authorization code exchange failed: {0}")]
    Exchange(String),

    #[error("Fetching the user profile failed: {0}")]
    Profile(String),
}
