// handlers/public/user.rs - Login, registration and password reset

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::analytics::{events, Identify, TrackEvent};
use crate::error::{ApiError, ApiResult};
use crate::handlers::required;
use crate::services::profile_service::HANDLE_TAKEN;
use crate::services::NewUser;
use crate::state::AppState;
use crate::types::{LoginResult, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub handle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestResetPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// `* /user/login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResult>> {
    let Json(body) = body?;
    let email = required(body.email, "email")?;
    let password = required(body.password, "password")?;

    let result = state.users.login(&email, &password).await?;

    let mut event = TrackEvent::new(result.user.id, events::USER_LOGGED_IN);
    if let Some(profile) = &result.active_profile {
        event = event.with("activeProfileId", profile.id.to_string());
    }
    state.track(event).await;

    Ok(Json(result))
}

/// `* /user/create`
///
/// User and profile are written in one transaction, so a taken handle
/// leaves no user behind.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResult>> {
    let Json(body) = body?;
    let email = required(body.email, "email")?;
    let password = required(body.password, "password")?;
    let handle = required(body.handle, "handle")?.trim().to_string();
    let name = body.name.filter(|n| !n.trim().is_empty());

    match state.profiles.get_profile_by_handle(&handle).await {
        Ok(_) => return Err(ApiError::conflict(HANDLE_TAKEN)),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    let (user, profile) = state
        .users
        .register(
            NewUser {
                email,
                password,
                name,
            },
            &handle,
        )
        .await?;

    let token = state.signer.issue(&user.email)?;

    state
        .track(TrackEvent::new(user.id, events::USER_CREATED).with("profileId", profile.id.to_string()))
        .await;
    let mut identify = Identify::new(user.id)
        .with("email", user.email.clone())
        .with("handle", profile.handle.clone())
        .with("createdAt", user.created_at.to_rfc3339());
    if let Some(name) = &user.name {
        identify = identify.with("name", name.clone());
    }
    state.identify(identify).await;

    Ok(Json(LoginResult {
        user,
        active_profile: Some(profile),
        token,
    }))
}

/// `* /user/request-reset-password`, rate limited per client.
pub async fn request_reset_password(
    State(state): State<AppState>,
    body: Result<Json<RequestResetPasswordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = body?;
    // No email means no account to find
    let email = body
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::not_found("Missing required field: email"))?;

    let user = state.users.send_password_reset_email(&email).await?;
    state
        .track(TrackEvent::new(user.id, events::PASSWORD_RESET_REQUESTED))
        .await;

    Ok(Json(MessageResponse::ok("Check your email for a link to reset your password.")))
}

/// `* /user/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = body?;
    let token = required(body.token, "token")?;
    let password = required(body.password, "password")?;

    state.users.change_password_with_token(&token, &password).await?;

    Ok(Json(MessageResponse::ok("Your password has been reset.")))
}
