use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::database::models::theme::{ThemeRow, THEME_COLUMNS};
use crate::error::{ApiError, ApiResult};
use crate::types::{Theme, ThemeContent};

pub const THEME_NOT_FOUND: &str = "Theme not found.";
pub const NO_THEMES_FOUND: &str = "No themes found.";

/// CRUD over the `themes` table.
///
/// Update and delete are scoped by owner in the statement itself, so a theme
/// owned by someone else is reported exactly like a missing one.
#[async_trait]
pub trait ThemeService: Send + Sync {
    async fn get_theme(&self, theme_id: Uuid) -> ApiResult<Theme>;

    /// Themes owned by `user_id`, plus global themes when `include_global`.
    /// An empty result is NOT_FOUND rather than an empty list.
    async fn list_themes(&self, user_id: Uuid, include_global: bool) -> ApiResult<Vec<Theme>>;

    async fn create_theme(&self, user_id: Uuid, label: &str, content: ThemeContent) -> ApiResult<Theme>;

    async fn update_theme(
        &self,
        theme_id: Uuid,
        user_id: Uuid,
        label: &str,
        content: ThemeContent,
    ) -> ApiResult<Theme>;

    /// Returns the theme as it was before deletion.
    async fn delete_theme(&self, theme_id: Uuid, user_id: Uuid) -> ApiResult<Theme>;

    async fn set_global(&self, theme_id: Uuid, global: bool) -> ApiResult<Theme>;

    /// Transfer ownership.
    async fn set_user_id(&self, theme_id: Uuid, user_id: Uuid) -> ApiResult<Theme>;
}

pub struct PgThemeService {
    pool: PgPool,
}

impl PgThemeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn found(row: Option<ThemeRow>) -> ApiResult<Theme> {
    row.map(Theme::from).ok_or_else(|| ApiError::not_found(THEME_NOT_FOUND))
}

#[async_trait]
impl ThemeService for PgThemeService {
    async fn get_theme(&self, theme_id: Uuid) -> ApiResult<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!("SELECT {THEME_COLUMNS} FROM themes WHERE id = $1"))
            .bind(theme_id)
            .fetch_optional(&self.pool)
            .await?;

        found(row)
    }

    async fn list_themes(&self, user_id: Uuid, include_global: bool) -> ApiResult<Vec<Theme>> {
        let rows = sqlx::query_as::<_, ThemeRow>(&format!(
            "SELECT {THEME_COLUMNS} FROM themes
             WHERE user_id = $1 OR ($2 AND global)
             ORDER BY created_at, id"
        ))
        .bind(user_id)
        .bind(include_global)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(ApiError::not_found(NO_THEMES_FOUND));
        }

        Ok(rows.into_iter().map(Theme::from).collect())
    }

    async fn create_theme(&self, user_id: Uuid, label: &str, content: ThemeContent) -> ApiResult<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            "INSERT INTO themes (user_id, label, colors, custom_css, custom_html)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {THEME_COLUMNS}"
        ))
        .bind(user_id)
        .bind(label)
        .bind(Json(content.colors.unwrap_or_default()))
        .bind(content.custom_css)
        .bind(content.custom_html)
        .fetch_optional(&self.pool)
        .await?;

        let theme = row
            .map(Theme::from)
            .ok_or_else(|| ApiError::internal_server_error("The theme couldn't be created."))?;

        tracing::debug!("Created theme {} for user {}", theme.id, user_id);
        Ok(theme)
    }

    async fn update_theme(
        &self,
        theme_id: Uuid,
        user_id: Uuid,
        label: &str,
        content: ThemeContent,
    ) -> ApiResult<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            "UPDATE themes
             SET label = $3,
                 colors = COALESCE($4, colors),
                 custom_css = COALESCE($5, custom_css),
                 custom_html = COALESCE($6, custom_html)
             WHERE id = $1 AND user_id = $2
             RETURNING {THEME_COLUMNS}"
        ))
        .bind(theme_id)
        .bind(user_id)
        .bind(label)
        .bind(content.colors.map(Json))
        .bind(content.custom_css)
        .bind(content.custom_html)
        .fetch_optional(&self.pool)
        .await?;

        found(row)
    }

    async fn delete_theme(&self, theme_id: Uuid, user_id: Uuid) -> ApiResult<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            "DELETE FROM themes WHERE id = $1 AND user_id = $2 RETURNING {THEME_COLUMNS}"
        ))
        .bind(theme_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        found(row)
    }

    async fn set_global(&self, theme_id: Uuid, global: bool) -> ApiResult<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            "UPDATE themes SET global = $2 WHERE id = $1 RETURNING {THEME_COLUMNS}"
        ))
        .bind(theme_id)
        .bind(global)
        .fetch_optional(&self.pool)
        .await?;

        let theme = found(row)?;
        tracing::info!("Theme {} global flag set to {}", theme.id, global);
        Ok(theme)
    }

    async fn set_user_id(&self, theme_id: Uuid, user_id: Uuid) -> ApiResult<Theme> {
        let row = sqlx::query_as::<_, ThemeRow>(&format!(
            "UPDATE themes SET user_id = $2 WHERE id = $1 RETURNING {THEME_COLUMNS}"
        ))
        .bind(theme_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let theme = found(row)?;
        tracing::info!("Theme {} transferred to user {}", theme.id, user_id);
        Ok(theme)
    }
}
