use serde::{Deserialize, Serialize};

use crate::model::ids::SubtaskId;
use crate::model::project::ProjectError;

/// Smallest unit of trackable work within a project.
///
/// Names are not unique within a project; the id is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    id: SubtaskId,
    name: String,
    is_completed: bool,
}

impl Subtask {
    /// Creates an incomplete subtask with a fresh id. The name is stored as given.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidInput` if the name is empty or whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, ProjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProjectError::InvalidInput {
                field: "subtask name",
            });
        }
        Ok(Self {
            id: SubtaskId::generate(),
            name,
            is_completed: false,
        })
    }

    /// Rehydrate a subtask from storage without validation.
    ///
    /// Renames are allowed to leave an empty name behind, so persisted
    /// subtasks are taken as-is.
    #[must_use]
    pub fn from_persisted(id: SubtaskId, name: String, is_completed: bool) -> Self {
        Self {
            id,
            name,
            is_completed,
        }
    }

    #[must_use]
    pub fn id(&self) -> SubtaskId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub(crate) fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subtask_starts_incomplete() {
        let subtask = Subtask::new("Draft outline").unwrap();
        assert_eq!(subtask.name(), "Draft outline");
        assert!(!subtask.is_completed());
    }

    #[test]
    fn new_subtask_keeps_surrounding_whitespace() {
        let subtask = Subtask::new("  Draft outline ").unwrap();
        assert_eq!(subtask.name(), "  Draft outline ");
    }

    #[test]
    fn new_subtask_rejects_blank_name() {
        let err = Subtask::new(" \t").unwrap_err();
        assert_eq!(
            err,
            ProjectError::InvalidInput {
                field: "subtask name"
            }
        );
    }

    #[test]
    fn serializes_with_camel_case_flag() {
        let subtask = Subtask::new("Review").unwrap();
        let json = serde_json::to_value(&subtask).unwrap();
        assert_eq!(json["name"], "Review");
        assert_eq!(json["isCompleted"], false);
    }
}
