// handlers/protected/user.rs - Account endpoints for the authenticated caller

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analytics::{events, TrackEvent};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::{ActiveProfile, User};

pub const NO_PROFILE_ACCESS: &str = "You don't have access to that profile.";
const NOT_IMPLEMENTED: &str = "This feature is not available yet.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveProfileRequest {
    pub new_profile_id: Option<Uuid>,
}

/// `* /user`
pub async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<User> {
    Json(user)
}

// The three stubs take no extractors so no input can change their outcome.

/// `* /user/update`
pub async fn update() -> ApiError {
    ApiError::not_implemented(NOT_IMPLEMENTED)
}

/// `* /user/delete`
pub async fn delete() -> ApiError {
    ApiError::not_implemented(NOT_IMPLEMENTED)
}

/// `* /user/data-package`
pub async fn data_package() -> ApiError {
    ApiError::not_implemented(NOT_IMPLEMENTED)
}

/// `* /user/set-active-profile`
///
/// A missing profile and someone else's profile get the same 401.
pub async fn set_active_profile(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<SetActiveProfileRequest>, JsonRejection>,
) -> ApiResult<Json<ActiveProfile>> {
    let Json(body) = body?;
    let profile_id = body
        .new_profile_id
        .ok_or_else(|| ApiError::bad_request("Missing required field: newProfileId"))?;

    let profile = match state.profiles.get_profile(profile_id).await {
        Ok(profile) if profile.user_id == user.id => profile,
        Ok(_) => {
            tracing::warn!("User {} tried to activate profile {} they don't own", user.id, profile_id);
            return Err(ApiError::unauthorized(NO_PROFILE_ACCESS));
        }
        Err(e) if e.is_not_found() => return Err(ApiError::unauthorized(NO_PROFILE_ACCESS)),
        Err(e) => return Err(e),
    };

    let active = state.users.set_active_profile(user.id, profile.id).await?;
    state
        .track(
            TrackEvent::new(user.id, events::ACTIVE_PROFILE_CHANGED)
                .with("profileId", profile.id.to_string())
                .with("handle", profile.handle),
        )
        .await;

    Ok(Json(active))
}
