use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{password, reset_token, TokenSigner};
use crate::config::{MailConfig, PasswordResetConfig};
use crate::database::models::profile::{ProfileRow, PROFILE_COLUMNS};
use crate::database::models::reset_token::ResetTokenRow;
use crate::database::models::user::{UserRow, USER_COLUMNS};
use crate::error::{ApiError, ApiResult};
use crate::mailer::{self, Mailer};
use crate::services::profile_service::HANDLE_TAKEN;
use crate::types::{ActiveProfile, LoginResult, Profile, User};

pub const USER_NOT_FOUND: &str = "User not found.";
pub const BAD_CREDENTIALS: &str = "Incorrect email or password.";
pub const EMAIL_TAKEN: &str = "An account with that email already exists.";
pub const NO_ACCOUNT_FOR_EMAIL: &str = "No account exists for that email address.";
pub const INVALID_RESET_TOKEN: &str = "This password reset link is invalid or has expired.";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// Verify credentials and issue a session token.
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResult>;

    /// Create the user and their first profile, made active. Either both
    /// rows are written or neither is.
    async fn register(&self, new_user: NewUser, handle: &str) -> ApiResult<(User, Profile)>;

    async fn get_user_by_email(&self, email: &str) -> ApiResult<User>;

    /// Issue a single-use reset token and mail its link to the account owner.
    async fn send_password_reset_email(&self, email: &str) -> ApiResult<User>;

    /// Redeem a reset token and replace the password.
    async fn change_password_with_token(&self, token: &str, new_password: &str) -> ApiResult<()>;

    async fn set_active_profile(&self, user_id: Uuid, profile_id: Uuid) -> ApiResult<ActiveProfile>;
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct PgUserService {
    pool: PgPool,
    signer: TokenSigner,
    mailer: Arc<dyn Mailer>,
    reset: PasswordResetConfig,
    mail_from: String,
}

impl PgUserService {
    pub fn new(
        pool: PgPool,
        signer: TokenSigner,
        mailer: Arc<dyn Mailer>,
        reset: PasswordResetConfig,
        mail: &MailConfig,
    ) -> Self {
        Self {
            pool,
            signer,
            mailer,
            reset,
            mail_from: mail.from_address.clone(),
        }
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_profile(&self, profile_id: Uuid) -> ApiResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    fn reset_link(&self, token: &str) -> String {
        let separator = if self.reset.reset_url_base.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.reset.reset_url_base, separator, token)
    }
}

#[async_trait]
impl UserService for PgUserService {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResult> {
        let row = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

        if !password::verify_password(password, &row.password_hash)? {
            tracing::info!("Failed login for user {}", row.id);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        let active_profile = match row.active_profile_id {
            Some(profile_id) => self.find_profile(profile_id).await?,
            None => None,
        };
        let token = self.signer.issue(&row.email)?;

        tracing::info!("User {} logged in", row.id);
        Ok(LoginResult {
            user: row.into(),
            active_profile,
            token,
        })
    }

    async fn register(&self, new_user: NewUser, handle: &str) -> ApiResult<(User, Profile)> {
        let password_hash = password::hash_password(&new_user.password)?;
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(normalize_email(&new_user.email))
        .bind(password_hash)
        .bind(new_user.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))?;

        let profile = sqlx::query_as::<_, ProfileRow>(&format!(
            "INSERT INTO profiles (user_id, handle) VALUES ($1, $2) RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user.id)
        .bind(handle)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, HANDLE_TAKEN))?;

        let user = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET active_profile_id = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(profile.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Created user {} with profile {}", user.id, profile.id);
        Ok((user.into(), profile.into()))
    }

    async fn get_user_by_email(&self, email: &str) -> ApiResult<User> {
        self.find_by_email(email)
            .await?
            .map(User::from)
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
    }

    async fn send_password_reset_email(&self, email: &str) -> ApiResult<User> {
        let user: User = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::not_found(NO_ACCOUNT_FOR_EMAIL))?
            .into();

        let token = reset_token::generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(self.reset.token_ttl_minutes);

        sqlx::query("INSERT INTO reset_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(reset_token::digest(&token))
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        let email = mailer::password_reset_email(
            &self.mail_from,
            &user.email,
            &self.reset_link(&token),
            self.reset.token_ttl_minutes,
        );
        self.mailer.send(email).await?;

        tracing::info!("Password reset requested for user {}", user.id);
        Ok(user)
    }

    async fn change_password_with_token(&self, token: &str, new_password: &str) -> ApiResult<()> {
        let password_hash = password::hash_password(new_password)?;
        let mut tx = self.pool.begin().await?;

        // Claiming the token and using it happen in one transaction
        let claimed = sqlx::query_as::<_, ResetTokenRow>(
            "UPDATE reset_tokens SET used_at = now()
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > now()
             RETURNING id, user_id, expires_at, used_at",
        )
        .bind(reset_token::digest(token))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::bad_request(INVALID_RESET_TOKEN))?;

        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(claimed.user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Password reset completed for user {} (token {})", claimed.user_id, claimed.id);
        Ok(())
    }

    async fn set_active_profile(&self, user_id: Uuid, profile_id: Uuid) -> ApiResult<ActiveProfile> {
        let row: Option<(Uuid, Uuid)> = sqlx::query_as(
            "UPDATE users SET active_profile_id = $2 WHERE id = $1 RETURNING id, active_profile_id",
        )
        .bind(user_id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        let (user_id, profile_id) = row.ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
        Ok(ActiveProfile { user_id, profile_id })
    }
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::conflict(message),
        e => e.into(),
    }
}
