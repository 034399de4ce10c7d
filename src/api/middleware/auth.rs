use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::Profile,
    error::{AppError, Result},
};

#[derive(Clone)]
pub struct CurrentUser {
    pub profile: Profile,
}

impl CurrentUser {
    pub fn user_id(&self) -> uuid::Uuid {
        self.profile.user_id
    }
}

/// Resolves the session cookie to a live session and the profile behind it.
async fn resolve_current_user(state: &AppState, jar: &CookieJar) -> Result<CurrentUser> {
    let session_cookie = jar
        .get(SESSION_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let session = state.service_context.auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let profile = state.service_context.profile_repo
        .find_by_user_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(CurrentUser { profile })
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let current_user = resolve_current_user(&state, &jar).await?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let current_user = resolve_current_user(&state, &jar).await?;

    if !current_user.profile.is_admin() {
        tracing::warn!(
            "Non-admin user {} attempted to access {}",
            current_user.user_id(),
            request.uri().path()
        );
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
