//! Product analytics. The client is optional: when no write key is
//! configured nothing is tracked and nothing is logged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AnalyticsConfig;

pub mod events {
    pub const USER_LOGGED_IN: &str = "User Logged In";
    pub const USER_CREATED: &str = "User Created";
    pub const PASSWORD_RESET_REQUESTED: &str = "Password Reset Requested";
    pub const ACTIVE_PROFILE_CHANGED: &str = "Active Profile Changed";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub user_id: String,
    pub event: String,
    pub properties: Map<String, Value>,
}

impl TrackEvent {
    pub fn new(user_id: Uuid, event: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            event: event.to_string(),
            properties: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    pub user_id: String,
    pub traits: Map<String, Value>,
}

impl Identify {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id: user_id.to_string(),
            traits: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.traits.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("analytics request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analytics endpoint returned status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Analytics: Send + Sync {
    async fn track(&self, event: TrackEvent) -> Result<(), AnalyticsError>;
    async fn identify(&self, identify: Identify) -> Result<(), AnalyticsError>;
}

/// Segment-compatible HTTP tracking API client.
pub struct SegmentAnalytics {
    client: reqwest::Client,
    endpoint: String,
    write_key: String,
}

impl SegmentAnalytics {
    pub fn new(
        endpoint: impl Into<String>,
        write_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            write_key: write_key.into(),
        })
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), AnalyticsError> {
        let response = self
            .client
            .post(format!("{}{}", self.endpoint, path))
            .basic_auth(&self.write_key, Some(""))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Analytics for SegmentAnalytics {
    async fn track(&self, event: TrackEvent) -> Result<(), AnalyticsError> {
        self.post("/v1/track", &event).await
    }

    async fn identify(&self, identify: Identify) -> Result<(), AnalyticsError> {
        self.post("/v1/identify", &identify).await
    }
}

pub fn from_config(config: &AnalyticsConfig) -> Result<Option<Arc<dyn Analytics>>, AnalyticsError> {
    let Some(key) = &config.write_key else {
        return Ok(None);
    };

    let client = SegmentAnalytics::new(
        config.endpoint.clone(),
        key.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Some(Arc::new(client)))
}
