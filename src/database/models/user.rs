use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub active_profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

pub const USER_COLUMNS: &str = "id, email, password_hash, name, active_profile_id, created_at";
