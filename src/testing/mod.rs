//! In-memory service fakes and a router harness for handler tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::analytics::{Analytics, AnalyticsError, Identify, TrackEvent};
use crate::auth::{reset_token, TokenSigner};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::ResetRateLimiter;
use crate::routes;
use crate::services::profile_service::{HANDLE_TAKEN, PROFILE_NOT_FOUND};
use crate::services::theme_service::{NO_THEMES_FOUND, THEME_NOT_FOUND};
use crate::services::user_service::{
    normalize_email, BAD_CREDENTIALS, EMAIL_TAKEN, INVALID_RESET_TOKEN, NO_ACCOUNT_FOR_EMAIL, USER_NOT_FOUND,
};
use crate::services::{NewUser, ProfileService, ThemeService, UserService};
use crate::state::AppState;
use crate::types::{ActiveProfile, LoginResult, Profile, Theme, ThemeContent, User};

struct StoredUser {
    user: User,
    password: String,
}

struct StoredResetToken {
    token: String,
    user_id: Uuid,
    used: bool,
}

#[derive(Default)]
struct StoreData {
    users: Vec<StoredUser>,
    profiles: Vec<Profile>,
    themes: Vec<Theme>,
    reset_tokens: Vec<StoredResetToken>,
}

/// Tables shared by all fakes of one [`TestApp`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreData>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.inner.lock().unwrap()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn profile_count(&self) -> usize {
        self.lock().profiles.len()
    }

    pub fn theme_count(&self) -> usize {
        self.lock().themes.len()
    }

    pub fn reset_token_count(&self) -> usize {
        self.lock().reset_tokens.len()
    }

    pub fn last_reset_token(&self) -> Option<String> {
        self.lock().reset_tokens.last().map(|t| t.token.clone())
    }

    pub fn add_profile(&self, user_id: Uuid, handle: &str) -> Uuid {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            handle: handle.to_string(),
            created_at: Utc::now(),
        };
        let id = profile.id;
        self.lock().profiles.push(profile);
        id
    }

    pub fn active_profile_of(&self, user_id: Uuid) -> Option<Uuid> {
        self.lock()
            .users
            .iter()
            .find(|u| u.user.id == user_id)
            .and_then(|u| u.user.active_profile_id)
    }

    pub fn make_global(&self, theme_id: Uuid) {
        if let Some(theme) = self.lock().themes.iter_mut().find(|t| t.id == theme_id) {
            theme.global = true;
        }
    }
}

pub struct MemoryUserService {
    store: MemoryStore,
    signer: TokenSigner,
}

#[async_trait]
impl UserService for MemoryUserService {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResult> {
        let data = self.store.lock();
        let email = normalize_email(email);
        let stored = data
            .users
            .iter()
            .find(|u| u.user.email == email && u.password == password)
            .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

        let active_profile = stored
            .user
            .active_profile_id
            .and_then(|id| data.profiles.iter().find(|p| p.id == id).cloned());

        Ok(LoginResult {
            user: stored.user.clone(),
            active_profile,
            token: self.signer.issue(&stored.user.email)?,
        })
    }

    async fn register(&self, new_user: NewUser, handle: &str) -> ApiResult<(User, Profile)> {
        let mut data = self.store.lock();
        let email = normalize_email(&new_user.email);
        if data.users.iter().any(|u| u.user.email == email) {
            return Err(ApiError::conflict(EMAIL_TAKEN));
        }
        if data.profiles.iter().any(|p| p.handle == handle) {
            return Err(ApiError::conflict(HANDLE_TAKEN));
        }

        let user_id = Uuid::new_v4();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id,
            handle: handle.to_string(),
            created_at: Utc::now(),
        };
        let user = User {
            id: user_id,
            email,
            name: new_user.name,
            active_profile_id: Some(profile.id),
            created_at: Utc::now(),
        };
        data.users.push(StoredUser {
            user: user.clone(),
            password: new_user.password,
        });
        data.profiles.push(profile.clone());
        Ok((user, profile))
    }

    async fn get_user_by_email(&self, email: &str) -> ApiResult<User> {
        let email = normalize_email(email);
        self.store
            .lock()
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| u.user.clone())
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
    }

    async fn send_password_reset_email(&self, email: &str) -> ApiResult<User> {
        let mut data = self.store.lock();
        let email = normalize_email(email);
        let user = data
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| u.user.clone())
            .ok_or_else(|| ApiError::not_found(NO_ACCOUNT_FOR_EMAIL))?;

        data.reset_tokens.push(StoredResetToken {
            token: reset_token::generate_reset_token(),
            user_id: user.id,
            used: false,
        });
        Ok(user)
    }

    async fn change_password_with_token(&self, token: &str, new_password: &str) -> ApiResult<()> {
        let mut data = self.store.lock();
        let stored = data
            .reset_tokens
            .iter_mut()
            .find(|t| t.token == token && !t.used)
            .ok_or_else(|| ApiError::bad_request(INVALID_RESET_TOKEN))?;
        stored.used = true;
        let user_id = stored.user_id;

        if let Some(user) = data.users.iter_mut().find(|u| u.user.id == user_id) {
            user.password = new_password.to_string();
        }
        Ok(())
    }

    async fn set_active_profile(&self, user_id: Uuid, profile_id: Uuid) -> ApiResult<ActiveProfile> {
        let mut data = self.store.lock();
        let stored = data
            .users
            .iter_mut()
            .find(|u| u.user.id == user_id)
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
        stored.user.active_profile_id = Some(profile_id);
        Ok(ActiveProfile { user_id, profile_id })
    }
}

pub struct MemoryProfileService {
    store: MemoryStore,
}

#[async_trait]
impl ProfileService for MemoryProfileService {
    async fn get_profile(&self, profile_id: Uuid) -> ApiResult<Profile> {
        self.store
            .lock()
            .profiles
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))
    }

    async fn get_profile_by_handle(&self, handle: &str) -> ApiResult<Profile> {
        self.store
            .lock()
            .profiles
            .iter()
            .find(|p| p.handle == handle)
            .cloned()
            .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))
    }
}

pub struct MemoryThemeService {
    store: MemoryStore,
}

impl MemoryThemeService {
    fn owned_mut<'a>(data: &'a mut StoreData, theme_id: Uuid, user_id: Uuid) -> ApiResult<&'a mut Theme> {
        data.themes
            .iter_mut()
            .find(|t| t.id == theme_id && t.user_id == Some(user_id))
            .ok_or_else(|| ApiError::not_found(THEME_NOT_FOUND))
    }

    fn by_id_mut(data: &mut StoreData, theme_id: Uuid) -> ApiResult<&mut Theme> {
        data.themes
            .iter_mut()
            .find(|t| t.id == theme_id)
            .ok_or_else(|| ApiError::not_found(THEME_NOT_FOUND))
    }
}

#[async_trait]
impl ThemeService for MemoryThemeService {
    async fn get_theme(&self, theme_id: Uuid) -> ApiResult<Theme> {
        let mut data = self.store.lock();
        let theme = Self::by_id_mut(&mut data, theme_id)?.clone();
        Ok(theme)
    }

    async fn list_themes(&self, user_id: Uuid, include_global: bool) -> ApiResult<Vec<Theme>> {
        let themes: Vec<Theme> = self
            .store
            .lock()
            .themes
            .iter()
            .filter(|t| t.user_id == Some(user_id) || (include_global && t.global))
            .cloned()
            .collect();

        if themes.is_empty() {
            return Err(ApiError::not_found(NO_THEMES_FOUND));
        }
        Ok(themes)
    }

    async fn create_theme(&self, user_id: Uuid, label: &str, content: ThemeContent) -> ApiResult<Theme> {
        let theme = Theme {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            label: label.to_string(),
            colors: content.colors.unwrap_or_default(),
            custom_css: content.custom_css,
            custom_html: content.custom_html,
            global: false,
            created_at: Utc::now(),
        };
        self.store.lock().themes.push(theme.clone());
        Ok(theme)
    }

    async fn update_theme(
        &self,
        theme_id: Uuid,
        user_id: Uuid,
        label: &str,
        content: ThemeContent,
    ) -> ApiResult<Theme> {
        let mut data = self.store.lock();
        let theme = Self::owned_mut(&mut data, theme_id, user_id)?;
        theme.label = label.to_string();
        if let Some(colors) = content.colors {
            theme.colors = colors;
        }
        if content.custom_css.is_some() {
            theme.custom_css = content.custom_css;
        }
        if content.custom_html.is_some() {
            theme.custom_html = content.custom_html;
        }
        Ok(theme.clone())
    }

    async fn delete_theme(&self, theme_id: Uuid, user_id: Uuid) -> ApiResult<Theme> {
        let mut data = self.store.lock();
        let deleted = Self::owned_mut(&mut data, theme_id, user_id)?.clone();
        data.themes.retain(|t| t.id != theme_id);
        Ok(deleted)
    }

    async fn set_global(&self, theme_id: Uuid, global: bool) -> ApiResult<Theme> {
        let mut data = self.store.lock();
        let theme = Self::by_id_mut(&mut data, theme_id)?;
        theme.global = global;
        Ok(theme.clone())
    }

    async fn set_user_id(&self, theme_id: Uuid, user_id: Uuid) -> ApiResult<Theme> {
        let mut data = self.store.lock();
        let theme = Self::by_id_mut(&mut data, theme_id)?;
        theme.user_id = Some(user_id);
        Ok(theme.clone())
    }
}

/// Keeps every call instead of sending it.
#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<TrackEvent>>,
    identified: Mutex<Vec<Identify>>,
}

impl RecordingAnalytics {
    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|e| e.event.clone()).collect()
    }

    pub fn last_event(&self) -> Option<TrackEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn identified_count(&self) -> usize {
        self.identified.lock().unwrap().len()
    }
}

#[async_trait]
impl Analytics for RecordingAnalytics {
    async fn track(&self, event: TrackEvent) -> Result<(), AnalyticsError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn identify(&self, identify: Identify) -> Result<(), AnalyticsError> {
        self.identified.lock().unwrap().push(identify);
        Ok(())
    }
}

/// The full router over in-memory services.
pub struct TestApp {
    pub store: MemoryStore,
    pub signer: TokenSigner,
    router: Router,
    analytics: Option<Arc<RecordingAnalytics>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_analytics() -> Self {
        Self::build(Some(Arc::new(RecordingAnalytics::default())))
    }

    fn build(analytics: Option<Arc<RecordingAnalytics>>) -> Self {
        let config = AppConfig::development();
        let signer = TokenSigner::from_config(&config.security);
        let store = MemoryStore::default();

        let state = AppState {
            users: Arc::new(MemoryUserService {
                store: store.clone(),
                signer: signer.clone(),
            }),
            profiles: Arc::new(MemoryProfileService { store: store.clone() }),
            themes: Arc::new(MemoryThemeService { store: store.clone() }),
            analytics: analytics.clone().map(|a| a as Arc<dyn Analytics>),
            signer: signer.clone(),
            reset_limiter: Arc::new(ResetRateLimiter::from_config(&config.rate_limit).unwrap()),
            pool: None,
        };

        Self {
            store,
            signer,
            router: routes::app(state, &config.security),
            analytics,
        }
    }

    pub fn analytics(&self) -> Option<&RecordingAnalytics> {
        self.analytics.as_deref()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn request(path: &str, token: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Self::request(path, None, body.to_string())).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> (StatusCode, Value) {
        self.send(Self::request(path, None, body.to_string())).await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Self::request(path, Some(token), body.to_string())).await
    }

    pub async fn post_auth_raw(&self, path: &str, token: &str, body: &str) -> (StatusCode, Value) {
        self.send(Self::request(path, Some(token), body.to_string())).await
    }

    /// Registers through `/user/create` and returns the session token and user id.
    pub async fn register(&self, email: &str, handle: &str) -> (String, Uuid) {
        let (status, body) = self
            .post(
                "/user/create",
                serde_json::json!({"email": email, "password": "secret", "handle": handle}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "registration failed: {body}");

        let token = body["token"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        (token, user_id)
    }
}
