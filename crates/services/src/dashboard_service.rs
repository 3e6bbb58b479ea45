use std::sync::Arc;

use storage::repository::ProjectStore;
use tracker_core::model::Session;

use crate::error::DashboardServiceError;
use crate::views::{Dashboard, ProgressReport, ProjectBoard};

/// Read-only views over the signed-in user's projects.
#[derive(Clone)]
pub struct DashboardService {
    projects: Arc<dyn ProjectStore>,
}

impl DashboardService {
    #[must_use]
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    /// # Errors
    ///
    /// Returns `DashboardServiceError::Storage` if the snapshot cannot be loaded.
    pub async fn dashboard(&self, session: &Session) -> Result<Dashboard, DashboardServiceError> {
        let projects = self.projects.list_projects(session.user_key()).await?;
        Ok(Dashboard::from_projects(&projects))
    }

    /// # Errors
    ///
    /// Returns `DashboardServiceError::Storage` if the snapshot cannot be loaded.
    pub async fn project_board(
        &self,
        session: &Session,
    ) -> Result<ProjectBoard, DashboardServiceError> {
        let projects = self.projects.list_projects(session.user_key()).await?;
        Ok(ProjectBoard::from_projects(&projects))
    }

    /// # Errors
    ///
    /// Returns `DashboardServiceError::Storage` if the snapshot cannot be loaded.
    pub async fn progress_report(
        &self,
        session: &Session,
    ) -> Result<ProgressReport, DashboardServiceError> {
        let projects = self.projects.list_projects(session.user_key()).await?;
        Ok(ProgressReport::from_projects(&projects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{InMemoryRepository, StorageError};

    #[tokio::test]
    async fn new_user_sees_empty_dashboard() {
        let service = DashboardService::new(Arc::new(InMemoryRepository::new()));
        let session = Session::new("new@user.io").unwrap();

        let dashboard = service.dashboard(&session).await.unwrap();
        assert_eq!(dashboard.stats.total_projects, 0);
        assert_eq!(dashboard.stats.average_progress, 0);
        assert!(dashboard.projects.is_empty());
    }

    #[tokio::test]
    async fn outage_is_reported() {
        let repo = InMemoryRepository::new();
        repo.set_offline(true);
        let service = DashboardService::new(Arc::new(repo));
        let session = Session::new("new@user.io").unwrap();

        let err = service.progress_report(&session).await.unwrap_err();
        assert!(matches!(
            err,
            DashboardServiceError::Storage(StorageError::Unavailable(_))
        ));
    }
}
