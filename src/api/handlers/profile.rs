use axum::{
    extract::{Extension, State},
    Json,
};
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Profile, UpdateProfileRequest},
    error::Result,
};

pub async fn get(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<Profile> {
    Json(current_user.profile)
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(update): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    update.validate()?;

    let profile = state.service_context.profile_repo
        .update(current_user.user_id(), update)
        .await?;

    tracing::debug!("Profile updated for {}", profile.user_id);

    Ok(Json(profile))
}
