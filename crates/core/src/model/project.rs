use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{ProjectId, SubtaskId};
use crate::model::subtask::Subtask;
use crate::progress::{ProjectStatus, classify_status, compute_progress};
use crate::subtasks;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProjectError {
    #[error("{field} cannot be empty")]
    InvalidInput { field: &'static str },

    #[error("subtask index {index} out of range for {len} subtasks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("subtask {0} not found")]
    SubtaskNotFound(SubtaskId),
}

fn required(value: String, field: &'static str) -> Result<String, ProjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProjectError::InvalidInput { field });
    }
    Ok(trimmed.to_owned())
}

//
// ─── PROJECT ───────────────────────────────────────────────────────────────────
//

/// A named unit of work with a deadline and an ordered subtask list.
///
/// `progress` is cached for fast reads but has no setter: every change to the
/// subtask list goes through `set_subtasks`, which recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: ProjectId,
    #[serde(rename = "projectName")]
    name: String,
    deadline: String,
    subtasks: Vec<Subtask>,
    progress: u8,
}

impl Project {
    /// Rehydrate a project from storage.
    ///
    /// Progress is always recomputed from `subtasks`; a stale `stored_progress`
    /// is logged and discarded.
    #[must_use]
    pub fn from_persisted(
        id: ProjectId,
        name: String,
        deadline: String,
        subtasks: Vec<Subtask>,
        stored_progress: Option<u8>,
    ) -> Self {
        let progress = compute_progress(&subtasks);
        if let Some(stored) = stored_progress.filter(|stored| *stored != progress) {
            warn!(
                "event=progress_mismatch module=core project_id={id} stored={stored} recomputed={progress}"
            );
        }
        Self {
            id,
            name,
            deadline,
            subtasks,
            progress,
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn deadline(&self) -> &str {
        &self.deadline
    }

    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn status(&self) -> ProjectStatus {
        classify_status(self.progress)
    }

    /// Replace the subtask list and recompute progress.
    pub fn set_subtasks(&mut self, subtasks: Vec<Subtask>) {
        self.progress = compute_progress(&subtasks);
        self.subtasks = subtasks;
    }

    /// Rename the project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidInput` if the name is blank.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ProjectError> {
        self.name = required(name.into(), "project name")?;
        Ok(())
    }

    pub fn set_deadline(&mut self, deadline: impl Into<String>) {
        self.deadline = deadline.into().trim().to_owned();
    }

    /// Append a subtask and return its id.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidInput` if the name is blank.
    pub fn add_subtask(&mut self, name: &str) -> Result<SubtaskId, ProjectError> {
        let next = subtasks::add_subtask(&self.subtasks, name)?;
        let id = next
            .last()
            .map(Subtask::id)
            .ok_or(ProjectError::InvalidInput {
                field: "subtask name",
            })?;
        self.set_subtasks(next);
        Ok(id)
    }

    /// Flip a subtask's completion flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::SubtaskNotFound` if `id` is not in this project.
    pub fn toggle_subtask(&mut self, id: SubtaskId) -> Result<bool, ProjectError> {
        let index = subtasks::position_of(&self.subtasks, id)?;
        let next = subtasks::toggle_subtask(&self.subtasks, index)?;
        let completed = next[index].is_completed();
        self.set_subtasks(next);
        Ok(completed)
    }

    /// Rename a subtask. Empty names are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::SubtaskNotFound` if `id` is not in this project.
    pub fn rename_subtask(&mut self, id: SubtaskId, name: &str) -> Result<(), ProjectError> {
        let index = subtasks::position_of(&self.subtasks, id)?;
        let next = subtasks::rename_subtask(&self.subtasks, index, name)?;
        self.set_subtasks(next);
        Ok(())
    }

    /// Remove a subtask and return it.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::SubtaskNotFound` if `id` is not in this project.
    pub fn remove_subtask(&mut self, id: SubtaskId) -> Result<Subtask, ProjectError> {
        let index = subtasks::position_of(&self.subtasks, id)?;
        let removed = self.subtasks[index].clone();
        let next = subtasks::remove_subtask(&self.subtasks, index)?;
        self.set_subtasks(next);
        Ok(removed)
    }

    /// Merge the fields present in `patch` into this project.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = patch.name() {
            self.name = name.to_owned();
        }
        if let Some(deadline) = patch.deadline() {
            self.deadline = deadline.to_owned();
        }
        if let Some(subtasks) = patch.subtasks() {
            self.set_subtasks(subtasks.to_vec());
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// A validated project that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    name: String,
    deadline: String,
    subtasks: Vec<Subtask>,
}

impl ProjectDraft {
    /// Creates a draft with no subtasks.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidInput` if the name is blank.
    pub fn new(name: impl Into<String>, deadline: impl Into<String>) -> Result<Self, ProjectError> {
        Ok(Self {
            name: required(name.into(), "project name")?,
            deadline: deadline.into().trim().to_owned(),
            subtasks: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn deadline(&self) -> &str {
        &self.deadline
    }

    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        compute_progress(&self.subtasks)
    }

    #[must_use]
    pub fn assign_id(self, id: ProjectId) -> Project {
        let progress = compute_progress(&self.subtasks);
        Project {
            id,
            name: self.name,
            deadline: self.deadline,
            subtasks: self.subtasks,
            progress,
        }
    }
}

//
// ─── PATCH ─────────────────────────────────────────────────────────────────────
//

/// Partial update for a stored project. Absent fields are left untouched.
///
/// Subtasks and progress travel together: setting subtasks computes the
/// progress that will be written with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    name: Option<String>,
    deadline: Option<String>,
    subtasks: Option<Vec<Subtask>>,
    progress: Option<u8>,
}

impl ProjectPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch carrying every mutable field of `project`.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: Some(project.name.clone()),
            deadline: Some(project.deadline.clone()),
            subtasks: Some(project.subtasks.clone()),
            progress: Some(project.progress),
        }
    }

    /// # Errors
    ///
    /// Returns `ProjectError::InvalidInput` if the name is blank.
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ProjectError> {
        self.name = Some(required(name.into(), "project name")?);
        Ok(self)
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into().trim().to_owned());
        self
    }

    #[must_use]
    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.progress = Some(compute_progress(&subtasks));
        self.subtasks = Some(subtasks);
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<&str> {
        self.deadline.as_deref()
    }

    #[must_use]
    pub fn subtasks(&self) -> Option<&[Subtask]> {
        self.subtasks.as_deref()
    }

    /// Progress to persist alongside `subtasks`; `None` when subtasks are untouched.
    #[must_use]
    pub fn progress(&self) -> Option<u8> {
        self.progress
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
