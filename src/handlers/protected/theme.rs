// handlers/protected/theme.rs - Theme CRUD for the authenticated caller

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::handlers::required;
use crate::middleware::AuthUser;
use crate::services::theme_service::THEME_NOT_FOUND;
use crate::state::AppState;
use crate::types::{Theme, ThemeContent};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListThemesQuery {
    pub include_global: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThemeRequest {
    pub label: Option<String>,
    #[serde(flatten)]
    pub content: ThemeContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThemeRequest {
    pub theme_id: Option<Uuid>,
    pub label: Option<String>,
    #[serde(flatten)]
    pub content: ThemeContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteThemeRequest {
    pub theme_id: Option<Uuid>,
}

fn theme_id(value: Option<Uuid>) -> ApiResult<Uuid> {
    value.ok_or_else(|| ApiError::bad_request("Missing required field: themeId"))
}

/// `* /theme/list?includeGlobal=`
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    query: Result<Query<ListThemesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Theme>>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let themes = state
        .themes
        .list_themes(user.id, query.include_global.unwrap_or(true))
        .await?;
    Ok(Json(themes))
}

/// `* /theme/create`
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<CreateThemeRequest>, JsonRejection>,
) -> ApiResult<Json<Theme>> {
    let Json(body) = body?;
    let label = required(body.label, "label")?;
    let theme = state.themes.create_theme(user.id, &label, body.content).await?;
    Ok(Json(theme))
}

/// `* /theme/update`
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<UpdateThemeRequest>, JsonRejection>,
) -> ApiResult<Json<Theme>> {
    let Json(body) = body?;
    let theme_id = theme_id(body.theme_id)?;
    let label = required(body.label, "label")?;
    let theme = state
        .themes
        .update_theme(theme_id, user.id, &label, body.content)
        .await?;
    Ok(Json(theme))
}

/// `* /theme/delete`
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<DeleteThemeRequest>, JsonRejection>,
) -> ApiResult<Json<Theme>> {
    let Json(body) = body?;
    let theme = state.themes.delete_theme(theme_id(body.theme_id)?, user.id).await?;
    Ok(Json(theme))
}

/// `* /theme/:id`. Someone else's private theme is reported as missing.
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Theme>> {
    let Path(id) = id.map_err(|_| ApiError::not_found(THEME_NOT_FOUND))?;
    let theme = state.themes.get_theme(id).await?;

    if !theme.is_visible_to(user.id) {
        return Err(ApiError::not_found(THEME_NOT_FOUND));
    }
    Ok(Json(theme))
}
