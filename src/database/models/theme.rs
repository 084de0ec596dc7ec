use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::types::ThemeColors;

/// Raw `themes` row as stored; converted to `Theme` before leaving a service.
#[derive(Debug, Clone, FromRow)]
pub struct ThemeRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub label: String,
    pub colors: Json<ThemeColors>,
    pub custom_css: Option<String>,
    pub custom_html: Option<String>,
    pub global: bool,
    pub created_at: DateTime<Utc>,
}

/// Column list shared by every theme statement.
pub const THEME_COLUMNS: &str = "id, user_id, label, colors, custom_css, custom_html, global, created_at";
