use anyhow::Context;
use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::AuthUrl;
use oauth2::AuthorizationCode;
use oauth2::ClientId;
use oauth2::ClientSecret;
use oauth2::CsrfToken;
use oauth2::RedirectUrl;
use oauth2::Scope;
use oauth2::TokenResponse;
use oauth2::TokenUrl;
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::domain::federation::errors::FederationError;
use crate::domain::federation::ports::IdentityProviderPort;
use crate::domain::federation::profile::ExternalProfile;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth2 adapter: authorization-code flow plus a userinfo fetch.
///
/// The flow is sessionless by design; a random CSRF state is sent outbound
/// but there is no server-side store to check it against on callback.
pub struct GoogleIdentityProvider {
    oauth_client: BasicClient,
    http_client: reqwest::Client,
}

impl GoogleIdentityProvider {
    pub fn new(config: &GoogleConfig) -> anyhow::Result<Self> {
        let auth_url = AuthUrl::new(AUTH_URL.to_string())
            .context("Invalid authorization endpoint URL")?;
        let token_url =
            TokenUrl::new(TOKEN_URL.to_string()).context("Invalid token endpoint URL")?;
        let redirect_url = RedirectUrl::new(config.redirect_url.clone())
            .context("Invalid redirect URL")?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            oauth_client,
            http_client,
        })
    }
}

#[async_trait]
impl IdentityProviderPort for GoogleIdentityProvider {
    fn authorization_url(&self) -> String {
        let (url, _csrf_state) = self
            .oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .url();

        url.to_string()
    }

    async fn fetch_profile(&self, code: &str) -> Result<ExternalProfile, FederationError> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| FederationError::Exchange(e.to_string()))?;

        let response = self
            .http_client
            .get(USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| FederationError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FederationError::Profile(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        let userinfo: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| FederationError::Profile(e.to_string()))?;

        Ok(userinfo.into())
    }
}

/// OIDC userinfo response (standard claims subset).
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ExternalProfile {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            id: info.sub,
            emails: info.email.into_iter().collect(),
            display_name: info.name,
            given_name: info.given_name,
            family_name: info.family_name,
            photos: info.picture.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_userinfo_maps_to_profile() {
        let info = GoogleUserInfo {
            sub: "g1".to_string(),
            email: Some("Ana@X.com".to_string()),
            name: Some("Ana Lopez".to_string()),
            given_name: Some("Ana".to_string()),
            family_name: Some("Lopez".to_string()),
            picture: Some("https://example.com/ana.jpg".to_string()),
        };

        let profile: ExternalProfile = info.into();
        assert_eq!(profile.id, "g1");
        assert_eq!(profile.emails, vec!["Ana@X.com".to_string()]);
        assert_eq!(profile.photos, vec!["https://example.com/ana.jpg".to_string()]);
    }

    #[test]
    fn test_authorization_url_points_at_consent_with_scopes() {
        let provider = GoogleIdentityProvider::new(&GoogleConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "http://localhost:4000/auth/google/callback".to_string(),
            frontend_success_url: None,
        })
        .unwrap();

        let url = provider.authorization_url();
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("scope=profile+email"));
        assert!(url.contains("client_id=client"));
    }
}
