use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::error::{RentalError, RentalResult};
use crate::users::{NewTelegramUser, TelegramUser, TelegramUserProfilePhoto};
use crate::utils::logging::log_database_operation;

#[derive(Debug, Clone, FromRow)]
pub struct TelegramUserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub bio: String,
    pub language_code: String,
    pub is_premium: bool,
    pub registered_at: DateTime<Utc>,
}

impl From<TelegramUserRow> for TelegramUser {
    fn from(row: TelegramUserRow) -> Self {
        TelegramUser {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            bio: row.bio,
            language_code: row.language_code,
            is_premium: row.is_premium,
            registered_at: row.registered_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfilePhotoRow {
    pub id: i64,
    pub user_id: i64,
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    pub file_size: Option<i64>,
}

impl TryFrom<ProfilePhotoRow> for TelegramUserProfilePhoto {
    type Error = RentalError;

    fn try_from(row: ProfilePhotoRow) -> Result<Self, Self::Error> {
        let dimension = |value: i64| {
            u32::try_from(value)
                .map_err(|_| RentalError::integrity(format!("profile photo {} has size {}", row.id, value)))
        };

        Ok(TelegramUserProfilePhoto {
            id: Some(row.id),
            user_id: row.user_id,
            width: dimension(row.width)?,
            height: dimension(row.height)?,
            file_size: row.file_size.map(dimension).transpose()?,
            file_id: row.file_id,
            file_unique_id: row.file_unique_id,
        })
    }
}

impl TelegramUser {
    /// Returns the stored user, inserting it first if unknown. The flag tells
    /// whether a new row was created.
    pub async fn get_or_create(
        pool: &sqlx::SqlitePool,
        fields: NewTelegramUser,
    ) -> RentalResult<(TelegramUser, bool)> {
        let user = TelegramUser::new(fields)?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO telegram_users
                (id, first_name, last_name, username, bio, language_code, is_premium, registered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.bio)
        .bind(&user.language_code)
        .bind(user.is_premium)
        .bind(user.registered_at)
        .execute(pool)
        .await?;
        let created = result.rows_affected() > 0;
        if created {
            log_database_operation("INSERT", "telegram_users", Some(&user.id.to_string()));
        }

        let stored = Self::find_by_id(pool, user.id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("telegram user {}", user.id)))?;
        Ok((stored, created))
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> RentalResult<Option<TelegramUser>> {
        let row = sqlx::query_as::<_, TelegramUserRow>(
            "SELECT id, first_name, last_name, username, bio, language_code, is_premium, registered_at FROM telegram_users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(TelegramUser::from))
    }
}

impl TelegramUserProfilePhoto {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        photo: &TelegramUserProfilePhoto,
    ) -> RentalResult<TelegramUserProfilePhoto> {
        if TelegramUser::find_by_id(pool, photo.user_id).await?.is_none() {
            return Err(RentalError::not_found(format!("telegram user {}", photo.user_id)));
        }

        log_database_operation("INSERT", "telegram_user_profile_photos", Some(&photo.file_unique_id));
        let result = sqlx::query(
            r#"
            INSERT INTO telegram_user_profile_photos (user_id, file_id, file_unique_id, width, height, file_size)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(photo.user_id)
        .bind(&photo.file_id)
        .bind(&photo.file_unique_id)
        .bind(i64::from(photo.width))
        .bind(i64::from(photo.height))
        .bind(photo.file_size.map(i64::from))
        .execute(pool)
        .await?;

        let mut stored = photo.clone();
        stored.id = Some(result.last_insert_rowid());
        Ok(stored)
    }

    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> RentalResult<Vec<TelegramUserProfilePhoto>> {
        let rows = sqlx::query_as::<_, ProfilePhotoRow>(
            "SELECT id, user_id, file_id, file_unique_id, width, height, file_size FROM telegram_user_profile_photos WHERE user_id = ? ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(TelegramUserProfilePhoto::try_from).collect()
    }
}
