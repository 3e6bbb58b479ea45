use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use storage::repository::{ProfileRepository, StorageError};
use tracker_core::model::{Session, SessionState, UserKey};

use crate::error::{AuthError, IdentityError};

/// Sign-in form input. The password is only ever handed to the identity provider.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// External credential check (hosted auth, OS keychain, ...).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns `Ok(true)` when the credentials are valid.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the provider cannot answer.
    async fn verify(&self, credentials: &Credentials) -> Result<bool, IdentityError>;
}

/// Turns verified credentials into a `Session`.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { identity, profiles }
    }

    /// Verify credentials and record the new session in `state`.
    ///
    /// `state` is left untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the provider rejects them.
    /// Returns `AuthError::Storage` (`NotFound`) if no profile exists for the email.
    pub async fn sign_in(
        &self,
        state: &mut SessionState,
        credentials: &Credentials,
    ) -> Result<Session, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let key = UserKey::from_email(&credentials.email)?;
        if !self.identity.verify(credentials).await? {
            warn!("event=sign_in module=services status=rejected user={key}");
            return Err(AuthError::InvalidCredentials);
        }

        if self.profiles.get_profile(&key).await?.is_none() {
            return Err(StorageError::NotFound.into());
        }

        let session = Session::new(credentials.email.as_str())?;
        state.sign_in(session.clone());
        info!("event=sign_in module=services status=ok user={key}");
        Ok(session)
    }

    /// Clear the current session, returning it if one was active.
    pub fn sign_out(&self, state: &mut SessionState) -> Option<Session> {
        let ended = state.sign_out();
        if let Some(session) = &ended {
            info!(
                "event=sign_out module=services status=ok user={}",
                session.user_key()
            );
        }
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use tracker_core::model::ProfileDraft;
    use tracker_core::time::fixed_now;

    /// Accepts exactly one password for every email.
    struct FixedPassword(&'static str);

    #[async_trait]
    impl IdentityProvider for FixedPassword {
        async fn verify(&self, credentials: &Credentials) -> Result<bool, IdentityError> {
            Ok(credentials.password == self.0)
        }
    }

    struct Down;

    #[async_trait]
    impl IdentityProvider for Down {
        async fn verify(&self, _credentials: &Credentials) -> Result<bool, IdentityError> {
            Err(IdentityError::Unavailable("timeout".into()))
        }
    }

    async fn repo_with_profile(email: &str) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let profile = ProfileDraft {
            email: email.into(),
            first_name: "Pat".into(),
            last_name: "Uy".into(),
        }
        .validate(fixed_now())
        .unwrap();
        repo.insert_profile(&profile).await.unwrap();
        repo
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn sign_in_then_out() {
        let repo = repo_with_profile("pat@uni.edu").await;
        let auth = AuthService::new(Arc::new(FixedPassword("s3cret")), Arc::new(repo));
        let mut state = SessionState::new();

        let session = auth
            .sign_in(&mut state, &creds("pat@uni.edu", "s3cret"))
            .await
            .unwrap();
        assert_eq!(session.user_key().as_str(), "pat_uni_edu");
        assert_eq!(state.current(), Some(&session));

        assert_eq!(auth.sign_out(&mut state), Some(session));
        assert!(!state.is_signed_in());
    }

    #[tokio::test]
    async fn wrong_password_keeps_state_empty() {
        let repo = repo_with_profile("pat@uni.edu").await;
        let auth = AuthService::new(Arc::new(FixedPassword("s3cret")), Arc::new(repo));
        let mut state = SessionState::new();

        let err = auth
            .sign_in(&mut state, &creds("pat@uni.edu", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!state.is_signed_in());
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let auth = AuthService::new(
            Arc::new(FixedPassword("s3cret")),
            Arc::new(InMemoryRepository::new()),
        );
        let mut state = SessionState::new();
        let err = auth
            .sign_in(&mut state, &creds("pat@uni.edu", "s3cret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Storage(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn blank_fields_and_provider_outage() {
        let repo = repo_with_profile("pat@uni.edu").await;
        let auth = AuthService::new(Arc::new(Down), Arc::new(repo));
        let mut state = SessionState::new();

        let err = auth
            .sign_in(&mut state, &creds("  ", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let err = auth
            .sign_in(&mut state, &creds("pat@uni.edu", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Identity(_)));
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", creds("pat@uni.edu", "s3cret"));
        assert!(!rendered.contains("s3cret"));
    }
}
