//! Positional edits on a subtask sequence.
//!
//! Each operation validates first and returns a new sequence, so a rejected
//! edit leaves the caller's list untouched. Positions shift on removal; use
//! `position_of` to resolve a stable `SubtaskId` right before editing.

use crate::model::{ProjectError, Subtask, SubtaskId};

/// Append an incomplete subtask named `name`.
///
/// # Errors
///
/// Returns `ProjectError::InvalidInput` if the trimmed name is empty.
pub fn add_subtask(subtasks: &[Subtask], name: &str) -> Result<Vec<Subtask>, ProjectError> {
    let subtask = Subtask::new(name)?;
    let mut next = subtasks.to_vec();
    next.push(subtask);
    Ok(next)
}

/// Flip the completion flag at `index`.
///
/// # Errors
///
/// Returns `ProjectError::IndexOutOfRange` if `index` is not a valid position.
pub fn toggle_subtask(subtasks: &[Subtask], index: usize) -> Result<Vec<Subtask>, ProjectError> {
    check_index(subtasks, index)?;
    let mut next = subtasks.to_vec();
    next[index].toggle();
    Ok(next)
}

/// Rename the subtask at `index`. Empty names are accepted.
///
/// # Errors
///
/// Returns `ProjectError::IndexOutOfRange` if `index` is not a valid position.
pub fn rename_subtask(
    subtasks: &[Subtask],
    index: usize,
    new_name: &str,
) -> Result<Vec<Subtask>, ProjectError> {
    check_index(subtasks, index)?;
    let mut next = subtasks.to_vec();
    next[index].rename(new_name.to_owned());
    Ok(next)
}

/// Remove the subtask at `index`; later entries move down by one.
///
/// # Errors
///
/// Returns `ProjectError::IndexOutOfRange` if `index` is not a valid position.
pub fn remove_subtask(subtasks: &[Subtask], index: usize) -> Result<Vec<Subtask>, ProjectError> {
    check_index(subtasks, index)?;
    let mut next = subtasks.to_vec();
    next.remove(index);
    Ok(next)
}

/// Current position of the subtask with the given id.
///
/// # Errors
///
/// Returns `ProjectError::SubtaskNotFound` if no subtask carries `id`.
pub fn position_of(subtasks: &[Subtask], id: SubtaskId) -> Result<usize, ProjectError> {
    subtasks
        .iter()
        .position(|s| s.id() == id)
        .ok_or(ProjectError::SubtaskNotFound(id))
}

fn check_index(subtasks: &[Subtask], index: usize) -> Result<(), ProjectError> {
    if index < subtasks.len() {
        Ok(())
    } else {
        Err(ProjectError::IndexOutOfRange {
            index,
            len: subtasks.len(),
        })
    }
}
