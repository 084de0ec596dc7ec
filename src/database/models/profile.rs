use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

pub const PROFILE_COLUMNS: &str = "id, user_id, handle, created_at";
