use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::federation::profile::ExternalProfile;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::models::DEFAULT_ROLE;
use crate::domain::user::ports::UserRepository;

/// Find-or-create/merge logic unifying local and federated user records.
///
/// Merging is additive-only: a populated field on the stored record is never
/// overwritten, only gaps are filled from the incoming profile. The store is
/// touched at most twice per reconciliation (one lookup pass, one
/// create-or-update).
pub struct IdentityReconciler<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> IdentityReconciler<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }

    /// Reconcile a verified external profile into a user record.
    ///
    /// Concurrent first logins for the same identity can both observe a miss
    /// and race on creation; the loser's unique-constraint failure is
    /// recovered by re-fetching and merging into the winner's record.
    pub async fn reconcile(&self, profile: &ExternalProfile) -> Result<User, UserError> {
        if let Some(existing) = self.find_existing(profile).await? {
            return self.merge(existing, profile).await;
        }

        match self.create(profile).await {
            Ok(user) => Ok(user),
            Err(
                err @ (UserError::GoogleIdAlreadyExists(_)
                | UserError::EmailAlreadyExists(_)
                | UserError::UsernameAlreadyExists(_)),
            ) => {
                // Lost a concurrent first-login race; the record exists now.
                tracing::debug!(
                    google_id = %profile.id,
                    "Concurrent federated creation detected, re-fetching"
                );
                match self.find_existing(profile).await? {
                    Some(existing) => self.merge(existing, profile).await,
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Lookup by google id first, then by email. The google id match wins
    /// when both would resolve: a linked federated identity must not be
    /// re-attached to another account through a shared email.
    async fn find_existing(&self, profile: &ExternalProfile) -> Result<Option<User>, UserError> {
        if let Some(user) = self.repository.find_by_google_id(&profile.id).await? {
            return Ok(Some(user));
        }

        match profile.normalized_email() {
            Some(email) => self.repository.find_by_email(email.as_str()).await,
            None => Ok(None),
        }
    }

    async fn create(&self, profile: &ExternalProfile) -> Result<User, UserError> {
        // An email local-part can carry characters the username charset
        // rejects; fall back to the provider-qualified name in that case.
        let username = Username::new(profile.derived_username())
            .or_else(|_| Username::new(profile.provider_username()))?;

        let user = User {
            id: UserId::new(),
            uuid: Uuid::new_v4(),
            google_id: Some(profile.id.clone()),
            email: profile.normalized_email(),
            username,
            password_hash: None,
            firstname: Some(profile.derived_firstname()),
            lastname: profile.derived_lastname(),
            picture: profile.picture(),
            role: DEFAULT_ROLE.to_string(),
            first_login: true,
            created_at: Utc::now(),
        };

        self.repository.create(user).await
    }

    /// Backfill empty fields from the profile; persist only when something
    /// actually changed.
    async fn merge(&self, mut user: User, profile: &ExternalProfile) -> Result<User, UserError> {
        let mut changed = false;

        if user.google_id.is_none() {
            user.google_id = Some(profile.id.clone());
            changed = true;
        }

        if user.picture.is_none() {
            if let Some(picture) = profile.picture() {
                user.picture = Some(picture);
                changed = true;
            }
        }

        if user.firstname.as_deref().map_or(true, str::is_empty) {
            user.firstname = Some(profile.derived_firstname());
            changed = true;
        }

        if user.lastname.as_deref().map_or(true, str::is_empty) {
            if let Some(lastname) = profile.derived_lastname() {
                user.lastname = Some(lastname);
                changed = true;
            }
        }

        if changed {
            self.repository.update(user).await
        } else {
            Ok(user)
        }
    }
}
