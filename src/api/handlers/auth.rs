use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{self, SESSION_COOKIE},
    domain::Profile,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: Option<String>,
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,
}

/// Full names are judged after trimming, so blank padding doesn't count.
fn validate_full_name(full_name: &str) -> std::result::Result<(), ValidationError> {
    let length = full_name.trim().chars().count();

    if length < 2 {
        return Err(ValidationError::new("full_name")
            .with_message("Full name must be at least 2 characters".into()));
    }
    if length > 200 {
        return Err(ValidationError::new("full_name")
            .with_message("Full name must be at most 200 characters".into()));
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub is_admin: bool,
    pub profile: Profile,
}

impl From<Profile> for MeResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            is_admin: profile.is_admin(),
            profile,
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<MeResponse>)> {
    req.validate()?;

    if let Some(confirm) = &req.confirm_password {
        if confirm != &req.password {
            return Err(AppError::Validation("Passwords don't match".to_string()));
        }
    }

    let auth_service = &state.service_context.auth_service;

    let user_id = auth_service
        .sign_up(&req.email, &req.password, Some(&req.full_name))
        .await?;

    let profile = state.service_context.profile_repo
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::Internal("Profile missing after sign-up".to_string()))?;

    let (_session, token) = auth_service.create_session(user_id).await?;
    let cookie = auth_service.create_session_cookie(&token);

    Ok((StatusCode::CREATED, jar.add(cookie), Json(profile.into())))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<MeResponse>)> {
    let auth_service = &state.service_context.auth_service;

    let (session, token) = auth_service.sign_in(&req.email, &req.password).await?;

    let profile = state.service_context.profile_repo
        .find_by_user_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::info!("User {} signed in", session.user_id);

    let cookie = auth_service.create_session_cookie(&token);

    Ok((jar.add(cookie), Json(profile.into())))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        state.service_context.auth_service
            .sign_out(session_cookie.value())
            .await?;
    }

    let jar = jar.add(auth::AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<MeResponse> {
    Json(current_user.profile.into())
}
