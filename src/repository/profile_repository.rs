use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Profile, Role, UpdateProfileRequest},
    error::{AppError, Result},
    repository::ProfileRepository,
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct ProfileRow {
    id: String,
    user_id: String,
    email: String,
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    role: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: ProfileRow) -> Result<Profile> {
        Ok(Profile {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            address: row.address,
            role: Role::parse(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid role: {}", row.role)))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn require(&self, user_id: Uuid) -> Result<Profile> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, email, full_name, phone, address, role,
                   created_at, updated_at
            FROM profiles
            WHERE user_id = ?
            "#
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_profile).transpose()
    }

    async fn list(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, email, full_name, phone, address, role,
                   created_at, updated_at
            FROM profiles
            ORDER BY created_at DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_profile)
            .collect()
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn update(&self, user_id: Uuid, update: UpdateProfileRequest) -> Result<Profile> {
        let existing = self.require(user_id).await?;

        let full_name = UpdateProfileRequest::merge_field(&update.full_name, &existing.full_name);
        let phone = UpdateProfileRequest::merge_field(&update.phone, &existing.phone);
        let address = UpdateProfileRequest::merge_field(&update.address, &existing.address);
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = ?,
                phone = ?,
                address = ?,
                updated_at = ?
            WHERE user_id = ?
            "#
        )
        .bind(&full_name)
        .bind(&phone)
        .bind(&address)
        .bind(now)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_user_id(user_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated profile".to_string())
        })
    }

    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Profile> {
        let result = sqlx::query("UPDATE profiles SET role = ?, updated_at = ? WHERE user_id = ?")
            .bind(role.as_str())
            .bind(Utc::now().naive_utc())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }

        self.require(user_id).await
    }
}
