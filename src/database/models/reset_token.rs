use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Only the SHA-256 digest of a reset token is persisted.
#[derive(Debug, Clone, FromRow)]
pub struct ResetTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}
