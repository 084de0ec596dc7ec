/// Public-facing domain objects shared by services and handlers

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Color slot name (e.g. "background", "accent") to CSS color value.
pub type ThemeColors = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: Uuid,
    /// `None` for themes that were never owned or whose owner was removed.
    pub user_id: Option<Uuid>,
    pub label: String,
    pub colors: ThemeColors,
    pub custom_css: Option<String>,
    pub custom_html: Option<String>,
    pub global: bool,
    pub created_at: DateTime<Utc>,
}

impl Theme {
    /// Global themes are visible to everyone, the rest only to their owner.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.global || self.user_id == Some(user_id)
    }
}

/// Editable theme fields; `None` leaves the stored value unchanged on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeContent {
    pub colors: Option<ThemeColors>,
    pub custom_css: Option<String>,
    pub custom_html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub active_profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

/// Which profile a user currently acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveProfile {
    pub user_id: Uuid,
    pub profile_id: Uuid,
}

/// Body returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user: User,
    pub active_profile: Option<Profile>,
    pub token: String,
}

/// Generic acknowledgement for flows that must not reveal details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
