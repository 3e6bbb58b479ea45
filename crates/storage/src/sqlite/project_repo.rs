use std::collections::HashMap;

use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use tracker_core::model::{Project, ProjectDraft, ProjectId, ProjectPatch, Subtask, UserKey};

use super::mapping::{map_subtask_row, position_to_i64, progress_from_i64, ser};
use super::{SqliteRepository, unavailable};
use crate::feed::ChangeListener;
use crate::path::StorePath;
use crate::repository::{ProjectStore, StorageError};

async fn insert_subtasks(
    tx: &mut Transaction<'_, Sqlite>,
    user: &UserKey,
    id: &ProjectId,
    subtasks: &[Subtask],
) -> Result<(), StorageError> {
    for (index, subtask) in subtasks.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO subtasks (user_key, project_id, position, id, name, is_completed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(user.as_str())
        .bind(id.as_str())
        .bind(position_to_i64(index)?)
        .bind(subtask.id().to_string())
        .bind(subtask.name())
        .bind(subtask.is_completed())
        .execute(&mut **tx)
        .await
        .map_err(unavailable)?;
    }
    Ok(())
}

fn project_from_row(row: &SqliteRow, subtasks: Vec<Subtask>) -> Result<Project, StorageError> {
    let stored_progress = progress_from_i64(row.try_get::<i64, _>("progress").map_err(ser)?)?;
    Ok(Project::from_persisted(
        ProjectId::new(row.try_get::<String, _>("id").map_err(ser)?),
        row.try_get("name").map_err(ser)?,
        row.try_get("deadline").map_err(ser)?,
        subtasks,
        Some(stored_progress),
    ))
}

#[async_trait::async_trait]
impl ProjectStore for SqliteRepository {
    async fn list_projects(&self, user: &UserKey) -> Result<Vec<Project>, StorageError> {
        let project_rows = sqlx::query(
            r"
            SELECT id, name, deadline, progress
            FROM projects
            WHERE user_key = ?1
            ORDER BY rowid ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let subtask_rows = sqlx::query(
            r"
            SELECT project_id, id, name, is_completed
            FROM subtasks
            WHERE user_key = ?1
            ORDER BY project_id ASC, position ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let mut by_project: HashMap<ProjectId, Vec<Subtask>> = HashMap::new();
        for row in &subtask_rows {
            let (project_id, subtask) = map_subtask_row(row)?;
            by_project.entry(project_id).or_default().push(subtask);
        }

        let mut projects = Vec::with_capacity(project_rows.len());
        for row in &project_rows {
            let id = ProjectId::new(row.try_get::<String, _>("id").map_err(ser)?);
            let subtasks = by_project.remove(&id).unwrap_or_default();
            projects.push(project_from_row(row, subtasks)?);
        }
        Ok(projects)
    }

    async fn get_project(&self, user: &UserKey, id: &ProjectId) -> Result<Project, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, deadline, progress
            FROM projects
            WHERE user_key = ?1 AND id = ?2
            ",
        )
        .bind(user.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?
        .ok_or(StorageError::NotFound)?;

        let subtask_rows = sqlx::query(
            r"
            SELECT project_id, id, name, is_completed
            FROM subtasks
            WHERE user_key = ?1 AND project_id = ?2
            ORDER BY position ASC
            ",
        )
        .bind(user.as_str())
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let mut subtasks = Vec::with_capacity(subtask_rows.len());
        for row in &subtask_rows {
            subtasks.push(map_subtask_row(row)?.1);
        }
        project_from_row(&row, subtasks)
    }

    async fn create_project(
        &self,
        user: &UserKey,
        draft: &ProjectDraft,
    ) -> Result<ProjectId, StorageError> {
        let id = ProjectId::generate();
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        sqlx::query(
            r"
            INSERT INTO projects (user_key, id, name, deadline, progress)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user.as_str())
        .bind(id.as_str())
        .bind(draft.name())
        .bind(draft.deadline())
        .bind(i64::from(draft.progress()))
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        insert_subtasks(&mut tx, user, &id, draft.subtasks()).await?;
        tx.commit().await.map_err(unavailable)?;

        debug!(
            "event=project_create module=storage backend=sqlite path={}",
            StorePath::project(user, &id)
        );
        self.feed.notify(user);
        Ok(id)
    }

    async fn update_project(
        &self,
        user: &UserKey,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let res = sqlx::query(
            r"
            UPDATE projects SET
                name = COALESCE(?1, name),
                deadline = COALESCE(?2, deadline),
                progress = COALESCE(?3, progress)
            WHERE user_key = ?4 AND id = ?5
            ",
        )
        .bind(patch.name())
        .bind(patch.deadline())
        .bind(patch.progress().map(i64::from))
        .bind(user.as_str())
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        if let Some(subtasks) = patch.subtasks() {
            sqlx::query("DELETE FROM subtasks WHERE user_key = ?1 AND project_id = ?2")
                .bind(user.as_str())
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(unavailable)?;
            insert_subtasks(&mut tx, user, id, subtasks).await?;
        }

        tx.commit().await.map_err(unavailable)?;

        debug!(
            "event=project_update module=storage backend=sqlite path={} subtasks={}",
            StorePath::project(user, id),
            patch.subtasks().is_some()
        );
        self.feed.notify(user);
        Ok(())
    }

    async fn delete_project(&self, user: &UserKey, id: &ProjectId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM projects WHERE user_key = ?1 AND id = ?2")
            .bind(user.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!(
            "event=project_delete module=storage backend=sqlite path={}",
            StorePath::project(user, id)
        );
        self.feed.notify(user);
        Ok(())
    }

    fn subscribe(&self, user: &UserKey) -> ChangeListener {
        self.feed.subscribe(user)
    }
}
