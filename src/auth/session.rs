use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A signed-in identity. Only the SHA-256 of the cookie token is stored.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    token_hash: String,
    expires_at: NaiveDateTime,
    created_at: NaiveDateTime,
    last_used_at: NaiveDateTime,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Session {
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            id: row.id,
            token_hash: row.token_hash,
            expires_at: row.expires_at.and_utc(),
            created_at: row.created_at.and_utc(),
            last_used_at: row.last_used_at.and_utc(),
        })
    }
}

pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let now = Utc::now().naive_utc();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at, last_used_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, token_hash, expires_at, created_at, last_used_at
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(hash_token(token))
        .bind(expires_at.naive_utc())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Looks up a live session and records the access in the same statement.
    /// Expired or unknown tokens resolve to `None`.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let now = Utc::now().naive_utc();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions
            SET last_used_at = ?
            WHERE token_hash = ? AND expires_at > ?
            RETURNING id, user_id, token_hash, expires_at, created_at, last_used_at
            "#
        )
        .bind(now)
        .bind(hash_token(token))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("Sign-out for an unknown or already removed session");
        }

        Ok(())
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        let removed = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(removed)
    }
}

pub(crate) fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store_with_user() -> (SessionStore, Uuid) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let user_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, 'x', ?)")
            .bind(user_id.to_string())
            .bind("session@example.com")
            .bind(Utc::now().naive_utc())
            .execute(&pool)
            .await
            .unwrap();

        (SessionStore::new(pool), user_id)
    }

    #[test]
    fn token_hash_is_stable_hex() {
        let hash = hash_token("test_token");
        assert_eq!(hash, hash_token("test_token"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_token("other_token"));
    }

    #[tokio::test]
    async fn live_session_resolves_and_stores_only_the_hash() {
        let (store, user_id) = store_with_user().await;

        let created = store
            .create(user_id, "raw-token", Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        assert_ne!(created.token_hash, "raw-token");

        let found = store.find_by_token("raw-token").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.user_id, user_id);
        assert!(found.last_used_at >= created.last_used_at);

        store.delete_by_token("raw-token").await.unwrap();
        assert!(store.find_by_token("raw-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_ignored_and_cleaned_up() {
        let (store, user_id) = store_with_user().await;

        store
            .create(user_id, "stale", Utc::now() - Duration::minutes(5))
            .await
            .unwrap();

        assert!(store.find_by_token("stale").await.unwrap().is_none());
        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
    }
}
