use async_trait::async_trait;

use crate::domain::federation::errors::FederationError;
use crate::domain::federation::profile::ExternalProfile;

/// Port for the external OAuth2 identity provider.
///
/// The provider's consent and token-exchange machinery is a black box; this
/// service only needs a consent URL to redirect into and a verified profile
/// out of a callback code.
#[async_trait]
pub trait IdentityProviderPort: Send + Sync + 'static {
    /// Consent-flow URL to redirect the user agent into.
    fn authorization_url(&self) -> String;

    /// Exchange a callback authorization code for a verified profile.
    ///
    /// # Errors
    /// * `Exchange` - code exchange was rejected by the provider
    /// * `Profile` - the userinfo round trip failed
    async fn fetch_profile(&self, code: &str) -> Result<ExternalProfile, FederationError>;
}
