use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub const TOO_MANY_RESET_REQUESTS: &str = "Too many password reset requests, please try again later.";

/// Checks between sweeps of clients whose allowance has fully refilled.
const PRUNE_EVERY: u64 = 1024;

/// Per-client limiter for password reset requests.
///
/// A client gets `requests` at once, and a single slot comes back only after
/// a whole `window`, so no window ever sees more than `requests`.
pub struct ResetRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    trusted_proxies: Vec<IpAddr>,
    checks: AtomicU64,
}

impl ResetRateLimiter {
    pub fn new(requests: u32, window: Duration) -> anyhow::Result<Self> {
        let burst = NonZeroU32::new(requests).ok_or_else(|| anyhow::anyhow!("reset request limit is zero"))?;
        let quota = Quota::with_period(window)
            .ok_or_else(|| anyhow::anyhow!("reset request window is zero"))?
            .allow_burst(burst);

        Ok(Self {
            limiter: RateLimiter::keyed(quota),
            trusted_proxies: Vec::new(),
            checks: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &RateLimitConfig) -> anyhow::Result<Self> {
        let limiter = Self::new(
            config.reset_password_requests,
            Duration::from_secs(config.reset_password_window_secs),
        )?;
        Ok(limiter.with_trusted_proxies(config.trusted_proxies.clone()))
    }

    #[must_use]
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = proxies;
        self
    }

    pub fn check(&self, client: &str) -> bool {
        let allowed = self.limiter.check_key(&client.to_string()).is_ok();

        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
        allowed
    }

    /// Forget clients that are back to a full allowance.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// The peer address, or the first `X-Forwarded-For` hop when the peer is
    /// a trusted proxy.
    fn client_key(&self, request: &Request) -> String {
        let Some(peer) = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
        else {
            return "unknown".to_string();
        };

        if !self.trusted_proxies.contains(&peer) {
            return peer.to_string();
        }

        request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(peer)
            .to_string()
    }
}

pub async fn reset_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = state.reset_limiter.client_key(&request);

    if !state.reset_limiter.check(&client) {
        tracing::warn!("Password reset rate limit exceeded for {}", client);
        return Err(ApiError::too_many_requests(TOO_MANY_RESET_REQUESTS));
    }

    Ok(next.run(request).await)
}
