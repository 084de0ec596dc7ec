//! Shared handler state.
//!
//! Handlers only see service traits, so the router can be driven in tests
//! with in-memory implementations.

use std::sync::Arc;

use sqlx::PgPool;

use crate::analytics::{Analytics, Identify, TrackEvent};
use crate::auth::TokenSigner;
use crate::middleware::rate_limit::ResetRateLimiter;
use crate::services::{ProfileService, ThemeService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub profiles: Arc<dyn ProfileService>,
    pub themes: Arc<dyn ThemeService>,
    pub analytics: Option<Arc<dyn Analytics>>,
    pub signer: TokenSigner,
    pub reset_limiter: Arc<ResetRateLimiter>,
    /// Only used by the health endpoint.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub async fn track(&self, event: TrackEvent) {
        let Some(analytics) = &self.analytics else {
            return;
        };
        let name = event.event.clone();
        if let Err(e) = analytics.track(event).await {
            tracing::warn!("Failed to track '{}': {}", name, e);
        }
    }

    pub async fn identify(&self, identify: Identify) {
        let Some(analytics) = &self.analytics else {
            return;
        };
        if let Err(e) = analytics.identify(identify).await {
            tracing::warn!("Failed to identify user: {}", e);
        }
    }
}
