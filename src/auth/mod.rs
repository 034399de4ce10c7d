use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    domain::Role,
    error::{is_unique_violation, AppError, Result},
};

pub mod session;

pub use session::{Session, SessionStore};

pub const SESSION_COOKIE: &str = "session";

/// Identity provider: owns credentials and sessions. Profiles are created
/// alongside the identity on sign-up, everything else about them lives in
/// the profile repository.
pub struct AuthService {
    pool: SqlitePool,
    session_store: SessionStore,
    session_duration_hours: i64,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        Self {
            session_store: SessionStore::new(pool.clone()),
            pool,
            session_duration_hours: config.session_duration_hours,
            secure_cookies: config.secure_cookies,
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Registers a new identity and its profile in one transaction.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Uuid> {
        let email = normalize_email(email);
        let password_hash = Self::hash_password(password).await?;
        let full_name = full_name.map(str::trim).filter(|n| !n.is_empty());

        let user_id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)"
        )
        .bind(user_id.to_string())
        .bind(&email)
        .bind(&password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, user_id, email, full_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(&email)
        .bind(full_name)
        .bind(Role::User.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Registered new user {}", user_id);
        Ok(user_id)
    }

    /// Checks credentials and opens a session. Returns the session and the
    /// raw token to hand back to the client.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(Session, String)> {
        let email = normalize_email(email);

        let credentials = sqlx::query_as::<_, (String, String)>(
            "SELECT id, password_hash FROM users WHERE email = ?"
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, password_hash)) = credentials else {
            return Err(AppError::InvalidCredentials);
        };

        if !Self::verify_password(password, &password_hash).await? {
            tracing::debug!("Rejected sign-in for {}", email);
            return Err(AppError::InvalidCredentials);
        }

        let user_id = Uuid::parse_str(&user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.create_session(user_id).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<()> {
        self.session_store.delete_by_token(token).await
    }

    pub async fn create_session(&self, user_id: Uuid) -> Result<(Session, String)> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);

        let session = self.session_store
            .create(user_id, &token, expires_at)
            .await?;

        Ok((session, token))
    }

    /// Resolves the identity behind a session token, if the session is live.
    pub async fn validate_session(&self, token: &str) -> Result<Option<Session>> {
        self.session_store.find_by_token(token).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }

    pub fn create_session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure_cookies)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
