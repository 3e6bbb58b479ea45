use tracker_core::model::{UserKey, UserProfile};

use super::mapping::map_profile_row;
use super::{SqliteRepository, unavailable};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user: &UserKey) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT email, first_name, last_name, created_at
            FROM users WHERE user_key = ?1
            ",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO users (user_key, email, first_name, last_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_key) DO NOTHING
            ",
        )
        .bind(profile.key().as_str())
        .bind(profile.email())
        .bind(profile.first_name())
        .bind(profile.last_name())
        .bind(profile.created_at())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::AlreadyExists);
        }
        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE users SET first_name = ?1, last_name = ?2
            WHERE user_key = ?3
            ",
        )
        .bind(profile.first_name())
        .bind(profile.last_name())
        .bind(profile.key().as_str())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
