use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::auth_service::{AuthService, IdentityProvider};
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::project_service::ProjectService;

/// Assembles app-facing services over one `Storage` backend.
#[derive(Clone)]
pub struct AppServices {
    projects: Arc<ProjectService>,
    dashboard: Arc<DashboardService>,
    profiles: Arc<ProfileService>,
    auth: Arc<AuthService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, identity: Arc<dyn IdentityProvider>) -> Self {
        let projects = Arc::new(ProjectService::new(Arc::clone(&storage.projects)));
        let dashboard = Arc::new(DashboardService::new(Arc::clone(&storage.projects)));
        let profiles = Arc::new(ProfileService::new(clock, Arc::clone(&storage.profiles)));
        let auth = Arc::new(AuthService::new(identity, Arc::clone(&storage.profiles)));
        Self {
            projects,
            dashboard,
            profiles,
            auth,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, identity))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::new(&Storage::in_memory(), clock, identity)
    }

    #[must_use]
    pub fn projects(&self) -> Arc<ProjectService> {
        Arc::clone(&self.projects)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }
}
