use crate::domain::user::models::EmailAddress;

/// Fallback first name when the provider sends no usable name at all.
pub const FALLBACK_FIRSTNAME: &str = "Usuario";

/// Verified profile returned by the external identity provider.
///
/// Every field except `id` is best-effort: providers omit names, emails, and
/// photos freely, so the derivation methods below turn this into the fields a
/// user record needs via explicit precedence chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Provider-scoped stable identifier.
    pub id: String,
    pub emails: Vec<String>,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub photos: Vec<String>,
}

impl ExternalProfile {
    /// First usable email, lower-cased and validated. Invalid or missing
    /// emails are treated as absent, never as an error.
    pub fn normalized_email(&self) -> Option<EmailAddress> {
        self.emails
            .iter()
            .find(|e| !e.is_empty())
            .and_then(|e| EmailAddress::new(e.clone()).ok())
    }

    /// Given name, else the first display-name token, else `"Usuario"`.
    pub fn derived_firstname(&self) -> String {
        if let Some(given) = self.given_name.as_deref().filter(|s| !s.is_empty()) {
            return given.to_string();
        }
        self.display_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_FIRSTNAME.to_string())
    }

    /// Family name, else the remaining display-name tokens joined by a
    /// space. May legitimately be absent.
    pub fn derived_lastname(&self) -> Option<String> {
        if let Some(family) = self.family_name.as_deref().filter(|s| !s.is_empty()) {
            return Some(family.to_string());
        }
        let rest = self
            .display_name
            .as_deref()?
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ");
        (!rest.is_empty()).then_some(rest)
    }

    /// Email local-part when an email is present, else the
    /// provider-qualified `google_<id>` to avoid colliding with local
    /// usernames.
    pub fn derived_username(&self) -> String {
        match self.normalized_email() {
            Some(email) => email.local_part().to_string(),
            None => self.provider_username(),
        }
    }

    /// The always-valid provider-qualified username.
    pub fn provider_username(&self) -> String {
        format!("google_{}", self.id)
    }

    pub fn picture(&self) -> Option<String> {
        self.photos.iter().find(|p| !p.is_empty()).cloned()
    }
}
