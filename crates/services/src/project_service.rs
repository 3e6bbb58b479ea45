use std::sync::Arc;

use log::{debug, info};
use storage::path::StorePath;
use storage::repository::{ProjectStore, ProjectSubscription, load_all};
use tracker_core::model::{
    Project, ProjectDraft, ProjectError, ProjectId, ProjectPatch, Session, Subtask, SubtaskId,
};

use crate::error::ProjectServiceError;

/// Orchestrates project editing and persistence for the signed-in user.
///
/// Every subtask edit is validated in memory first, then written through
/// `persist_subtasks` so the subtask list and its progress land in one store call.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
}

impl ProjectService {
    #[must_use]
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    /// Create an empty project and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if the name is blank.
    /// Returns `ProjectServiceError::Storage` if persistence fails.
    pub async fn create_project(
        &self,
        session: &Session,
        name: &str,
        deadline: &str,
    ) -> Result<ProjectId, ProjectServiceError> {
        let draft = ProjectDraft::new(name, deadline)?;
        let id = self
            .projects
            .create_project(session.user_key(), &draft)
            .await?;
        info!(
            "event=project_create module=services status=ok path={}",
            StorePath::project(session.user_key(), &id)
        );
        Ok(id)
    }

    /// Current snapshot of the user's projects.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` if repository access fails.
    pub async fn list_projects(
        &self,
        session: &Session,
    ) -> Result<Vec<Project>, ProjectServiceError> {
        Ok(self.projects.list_projects(session.user_key()).await?)
    }

    /// Snapshot plus a live subscription delivering later snapshots.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` if the initial load fails.
    pub async fn watch_projects(
        &self,
        session: &Session,
    ) -> Result<(Vec<Project>, ProjectSubscription), ProjectServiceError> {
        Ok(load_all(&self.projects, session.user_key()).await?)
    }

    /// Fetch a project by id.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` (`NotFound`) if it does not exist.
    pub async fn get_project(
        &self,
        session: &Session,
        id: &ProjectId,
    ) -> Result<Project, ProjectServiceError> {
        Ok(self.projects.get_project(session.user_key(), id).await?)
    }

    /// Update name and/or deadline, leaving subtasks and progress untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if a provided name is blank.
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn update_details(
        &self,
        session: &Session,
        id: &ProjectId,
        name: Option<&str>,
        deadline: Option<&str>,
    ) -> Result<(), ProjectServiceError> {
        let mut patch = ProjectPatch::new();
        if let Some(name) = name {
            patch = patch.with_name(name)?;
        }
        if let Some(deadline) = deadline {
            patch = patch.with_deadline(deadline);
        }
        self.projects
            .update_project(session.user_key(), id, &patch)
            .await?;
        Ok(())
    }

    /// Append a subtask and return the updated project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if the name is blank.
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn add_subtask(
        &self,
        session: &Session,
        id: &ProjectId,
        name: &str,
    ) -> Result<Project, ProjectServiceError> {
        self.edit_subtasks(session, id, |project| project.add_subtask(name).map(|_| ()))
            .await
    }

    /// Flip a subtask's completion flag and return the updated project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if the subtask is not in the project.
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn toggle_subtask(
        &self,
        session: &Session,
        id: &ProjectId,
        subtask: SubtaskId,
    ) -> Result<Project, ProjectServiceError> {
        self.edit_subtasks(session, id, |project| {
            project.toggle_subtask(subtask).map(|_| ())
        })
        .await
    }

    /// Rename a subtask and return the updated project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if the subtask is not in the project.
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn rename_subtask(
        &self,
        session: &Session,
        id: &ProjectId,
        subtask: SubtaskId,
        name: &str,
    ) -> Result<Project, ProjectServiceError> {
        self.edit_subtasks(session, id, |project| project.rename_subtask(subtask, name))
            .await
    }

    /// Remove a subtask and return the updated project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if the subtask is not in the project.
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn remove_subtask(
        &self,
        session: &Session,
        id: &ProjectId,
        subtask: SubtaskId,
    ) -> Result<Project, ProjectServiceError> {
        self.edit_subtasks(session, id, |project| {
            project.remove_subtask(subtask).map(|_| ())
        })
        .await
    }

    /// Persist a subtask list edited locally (e.g. an editor's "save changes").
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn save_subtasks(
        &self,
        session: &Session,
        id: &ProjectId,
        subtasks: Vec<Subtask>,
    ) -> Result<Project, ProjectServiceError> {
        self.edit_subtasks(session, id, |project| {
            project.set_subtasks(subtasks);
            Ok(())
        })
        .await
    }

    /// Write every editable field of `project` (name, deadline, subtasks and
    /// progress) in a single store update.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` if the project is missing or persistence fails.
    pub async fn save_project(
        &self,
        session: &Session,
        project: &Project,
    ) -> Result<(), ProjectServiceError> {
        let patch = ProjectPatch::from_project(project);
        self.projects
            .update_project(session.user_key(), project.id(), &patch)
            .await?;
        debug!(
            "event=project_save module=services path={} count={} progress={}",
            StorePath::project(session.user_key(), project.id()),
            project.subtasks().len(),
            project.progress()
        );
        Ok(())
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` (`NotFound`) if it does not exist.
    pub async fn delete_project(
        &self,
        session: &Session,
        id: &ProjectId,
    ) -> Result<(), ProjectServiceError> {
        self.projects
            .delete_project(session.user_key(), id)
            .await?;
        info!(
            "event=project_delete module=services status=ok path={}",
            StorePath::project(session.user_key(), id)
        );
        Ok(())
    }

    async fn edit_subtasks<F>(
        &self,
        session: &Session,
        id: &ProjectId,
        edit: F,
    ) -> Result<Project, ProjectServiceError>
    where
        F: FnOnce(&mut Project) -> Result<(), ProjectError>,
    {
        let mut project = self.projects.get_project(session.user_key(), id).await?;
        edit(&mut project)?;
        self.persist_subtasks(session, &project).await?;
        Ok(project)
    }

    async fn persist_subtasks(
        &self,
        session: &Session,
        project: &Project,
    ) -> Result<(), ProjectServiceError> {
        let patch = ProjectPatch::new().with_subtasks(project.subtasks().to_vec());
        self.projects
            .update_project(session.user_key(), project.id(), &patch)
            .await?;
        debug!(
            "event=subtasks_save module=services path={} count={} progress={}",
            StorePath::project(session.user_key(), project.id()),
            project.subtasks().len(),
            project.progress()
        );
        Ok(())
    }
}
