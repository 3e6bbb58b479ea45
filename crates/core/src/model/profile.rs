use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::user::{UserKey, UserKeyError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    #[error(transparent)]
    Key(#[from] UserKeyError),
}

/// Profile fields stored under `users/<key>`.
///
/// Credentials are deliberately absent; they belong to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    key: UserKey,
    email: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
}

/// Sign-up form input.
#[derive(Clone, Debug, Default)]
pub struct ProfileDraft {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial profile edit. Absent fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileDraft {
    /// Validate and normalize the draft into a profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::MissingField` if any field is blank.
    pub fn validate(self, created_at: DateTime<Utc>) -> Result<UserProfile, ProfileError> {
        let email = required(self.email, "email")?;
        let first_name = required(self.first_name, "first name")?;
        let last_name = required(self.last_name, "last name")?;
        let key = UserKey::from_email(&email)?;

        Ok(UserProfile {
            key,
            email,
            first_name,
            last_name,
            created_at,
        })
    }
}

impl UserProfile {
    /// Rehydrate a profile from storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the persisted fields no longer validate.
    pub fn from_persisted(
        email: String,
        first_name: String,
        last_name: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        ProfileDraft {
            email,
            first_name,
            last_name,
        }
        .validate(created_at)
    }

    /// Apply a partial edit, returning the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::MissingField` if a provided field is blank.
    pub fn apply(&self, update: ProfileUpdate) -> Result<Self, ProfileError> {
        let mut next = self.clone();
        if let Some(first_name) = update.first_name {
            next.first_name = required(first_name, "first name")?;
        }
        if let Some(last_name) = update.last_name {
            next.last_name = required(last_name, "last name")?;
        }
        Ok(next)
    }

    #[must_use]
    pub fn key(&self) -> &UserKey {
        &self.key
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn required(value: String, field: &'static str) -> Result<String, ProfileError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> ProfileDraft {
        ProfileDraft {
            email: "ana@school.edu".into(),
            first_name: " Ana ".into(),
            last_name: "Reyes".into(),
        }
    }

    #[test]
    fn validate_trims_and_derives_key() {
        let profile = draft().validate(fixed_now()).unwrap();
        assert_eq!(profile.first_name(), "Ana");
        assert_eq!(profile.key().as_str(), "ana_school_edu");
        assert_eq!(profile.display_name(), "Ana Reyes");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let mut d = draft();
        d.last_name = "  ".into();
        assert_eq!(
            d.validate(fixed_now()).unwrap_err(),
            ProfileError::MissingField("last name")
        );
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let profile = draft().validate(fixed_now()).unwrap();
        let updated = profile
            .apply(ProfileUpdate {
                first_name: Some("Ann".into()),
                last_name: None,
            })
            .unwrap();
        assert_eq!(updated.first_name(), "Ann");
        assert_eq!(updated.last_name(), "Reyes");
        assert_eq!(updated.email(), profile.email());
    }

    #[test]
    fn serialized_profile_has_no_password() {
        let profile = draft().validate(fixed_now()).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["firstName"], "Ana");
    }
}
