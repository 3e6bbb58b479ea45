use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracker_core::model::{ProjectId, Subtask, SubtaskId, UserProfile};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn progress_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| StorageError::Serialization(format!("invalid progress: {v}")))
}

pub(crate) fn position_to_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn map_subtask_row(row: &SqliteRow) -> Result<(ProjectId, Subtask), StorageError> {
    let project_id = ProjectId::new(row.try_get::<String, _>("project_id").map_err(ser)?);
    let id: SubtaskId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let subtask = Subtask::from_persisted(
        id,
        row.try_get("name").map_err(ser)?,
        row.try_get::<bool, _>("is_completed").map_err(ser)?,
    );
    Ok((project_id, subtask))
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<UserProfile, StorageError> {
    UserProfile::from_persisted(
        row.try_get("email").map_err(ser)?,
        row.try_get("first_name").map_err(ser)?,
        row.try_get("last_name").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
