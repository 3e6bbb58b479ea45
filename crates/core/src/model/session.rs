use serde::Serialize;

use crate::model::user::{UserKey, UserKeyError};

/// The signed-in user, passed explicitly to every service call that is scoped
/// to a user's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    email: String,
    user_key: UserKey,
}

impl Session {
    /// Build a session for the given email.
    ///
    /// # Errors
    ///
    /// Returns `UserKeyError::EmptyEmail` if the email is blank.
    pub fn new(email: impl Into<String>) -> Result<Self, UserKeyError> {
        let email = email.into().trim().to_owned();
        let user_key = UserKey::from_email(&email)?;
        Ok(Self { email, user_key })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn user_key(&self) -> &UserKey {
        &self.user_key
    }
}

/// Holder for the current session with an explicit lifecycle:
/// set on sign-in, cleared on sign-out.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current: Option<Session>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, session: Session) {
        self.current = Some(session);
    }

    /// Clears the current session, returning it if one was active.
    pub fn sign_out(&mut self) -> Option<Session> {
        self.current.take()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_derives_user_key() {
        let session = Session::new(" sam@uni.edu ").unwrap();
        assert_eq!(session.email(), "sam@uni.edu");
        assert_eq!(session.user_key().as_str(), "sam_uni_edu");
    }

    #[test]
    fn state_lifecycle() {
        let mut state = SessionState::new();
        assert!(!state.is_signed_in());

        state.sign_in(Session::new("sam@uni.edu").unwrap());
        assert_eq!(state.current().map(Session::email), Some("sam@uni.edu"));

        let ended = state.sign_out();
        assert!(ended.is_some());
        assert!(state.current().is_none());
        assert!(state.sign_out().is_none());
    }
}
