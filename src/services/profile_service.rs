use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::profile::{ProfileRow, PROFILE_COLUMNS};
use crate::error::{ApiError, ApiResult};
use crate::types::Profile;

pub const PROFILE_NOT_FOUND: &str = "Profile not found.";
pub const HANDLE_TAKEN: &str = "The profile couldn't be added because it is already being used.";

#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_profile(&self, profile_id: Uuid) -> ApiResult<Profile>;

    /// NOT_FOUND when the handle is free.
    async fn get_profile_by_handle(&self, handle: &str) -> ApiResult<Profile>;
}

pub struct PgProfileService {
    pool: PgPool,
}

impl PgProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileService for PgProfileService {
    async fn get_profile(&self, profile_id: Uuid) -> ApiResult<Profile> {
        sqlx::query_as::<_, ProfileRow>(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Profile::from)
            .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))
    }

    async fn get_profile_by_handle(&self, handle: &str) -> ApiResult<Profile> {
        sqlx::query_as::<_, ProfileRow>(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE handle = $1"))
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?
            .map(Profile::from)
            .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))
    }
}
