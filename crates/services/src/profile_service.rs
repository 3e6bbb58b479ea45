use std::sync::Arc;

use log::info;
use storage::path::StorePath;
use storage::repository::{ProfileRepository, StorageError};
use tracker_core::model::{ProfileDraft, ProfileUpdate, Session, UserProfile};

use crate::Clock;
use crate::error::ProfileServiceError;

/// Sign-up and profile editing.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { clock, profiles }
    }

    /// Validate and store a new profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` if a required field is blank.
    /// Returns `ProfileServiceError::Storage` (`AlreadyExists`) if the sanitized
    /// key is already taken, or on other storage failures.
    pub async fn sign_up(&self, draft: ProfileDraft) -> Result<UserProfile, ProfileServiceError> {
        let profile = draft.validate(self.clock.now())?;
        self.profiles.insert_profile(&profile).await?;
        info!(
            "event=sign_up module=services status=ok path={}",
            StorePath::user(profile.key())
        );
        Ok(profile)
    }

    /// Load the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` (`NotFound`) if no profile exists.
    pub async fn load(&self, session: &Session) -> Result<UserProfile, ProfileServiceError> {
        let profile = self
            .profiles
            .get_profile(session.user_key())
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(profile)
    }

    /// Apply a partial edit to the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` if a provided field is blank.
    /// Returns `ProfileServiceError::Storage` if the profile is missing or persistence fails.
    pub async fn update(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ProfileServiceError> {
        let current = self.load(session).await?;
        let updated = current.apply(update)?;
        self.profiles.update_profile(&updated).await?;
        Ok(updated)
    }
}
