use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserKeyError {
    #[error("email cannot be empty")]
    EmptyEmail,
}

/// Partition key under which a user's records live in the store.
///
/// Derived from an email address by replacing every `@` and `.` with `_`.
/// The mapping is many-to-one: `a.b@x.io` and `a_b@x_io` share a key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Sanitize an email into a store key.
    ///
    /// # Errors
    ///
    /// Returns `UserKeyError::EmptyEmail` if the email is empty or whitespace-only.
    pub fn from_email(email: &str) -> Result<Self, UserKeyError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(UserKeyError::EmptyEmail);
        }
        Ok(Self(sanitize_email(email)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn sanitize_email(email: &str) -> String {
    email
        .chars()
        .map(|c| if c == '@' || c == '.' { '_' } else { c })
        .collect()
}

impl fmt::Debug for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserKey({})", self.0)
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_at_and_dots() {
        let key = UserKey::from_email("jane.doe@school.edu.ph").unwrap();
        assert_eq!(key.as_str(), "jane_doe_school_edu_ph");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let key = UserKey::from_email("  a@b.c ").unwrap();
        assert_eq!(key.as_str(), "a_b_c");
    }

    #[test]
    fn rejects_blank_email() {
        assert_eq!(UserKey::from_email("  ").unwrap_err(), UserKeyError::EmptyEmail);
    }

    #[test]
    fn distinct_emails_can_collide() {
        let a = UserKey::from_email("a.b@x.io").unwrap();
        let b = UserKey::from_email("a_b@x_io").unwrap();
        assert_eq!(a, b);
    }
}
