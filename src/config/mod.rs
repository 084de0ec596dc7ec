use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub password_reset: PasswordResetConfig,
    pub analytics: AnalyticsConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub reset_password_requests: u32,
    pub reset_password_window_secs: u64,
    /// Peers whose `X-Forwarded-For` header is believed. Empty means the
    /// header is ignored and clients are keyed by peer address.
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfig {
    pub token_ttl_minutes: i64,
    pub reset_url_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Analytics is disabled when no write key is configured.
    #[serde(skip_serializing)]
    pub write_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Reset emails are only logged when no webhook is configured.
    pub webhook_url: Option<String>,
    pub from_address: String,
    pub timeout_secs: u64,
}

/// Session tokens are valid for one week.
pub const DEFAULT_JWT_EXPIRY_HOURS: u64 = 168;

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("FOLIO_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATE_LIMIT_RESET_PASSWORD_REQUESTS") {
            self.rate_limit.reset_password_requests =
                v.parse().unwrap_or(self.rate_limit.reset_password_requests);
        }
        if let Ok(v) = env::var("RATE_LIMIT_RESET_PASSWORD_WINDOW_SECS") {
            self.rate_limit.reset_password_window_secs =
                v.parse().unwrap_or(self.rate_limit.reset_password_window_secs);
        }
        if let Ok(v) = env::var("RATE_LIMIT_TRUSTED_PROXIES") {
            self.rate_limit.trusted_proxies = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
        }

        // Password reset overrides
        if let Ok(v) = env::var("PASSWORD_RESET_TOKEN_TTL_MINUTES") {
            self.password_reset.token_ttl_minutes =
                v.parse().unwrap_or(self.password_reset.token_ttl_minutes);
        }
        if let Ok(v) = env::var("PASSWORD_RESET_URL_BASE") {
            self.password_reset.reset_url_base = v;
        }

        // Analytics overrides
        if let Ok(v) = env::var("ANALYTICS_WRITE_KEY") {
            self.analytics.write_key = Some(v).filter(|k| !k.trim().is_empty());
        }
        if let Ok(v) = env::var("ANALYTICS_ENDPOINT") {
            self.analytics.endpoint = v;
        }
        if let Ok(v) = env::var("ANALYTICS_TIMEOUT_SECS") {
            self.analytics.timeout_secs = v.parse().unwrap_or(self.analytics.timeout_secs);
        }

        // Mail overrides
        if let Ok(v) = env::var("MAIL_WEBHOOK_URL") {
            self.mail.webhook_url = Some(v).filter(|u| !u.trim().is_empty());
        }
        if let Ok(v) = env::var("MAIL_FROM_ADDRESS") {
            self.mail.from_address = v;
        }
        if let Ok(v) = env::var("MAIL_TIMEOUT_SECS") {
            self.mail.timeout_secs = v.parse().unwrap_or(self.mail.timeout_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            },
            rate_limit: RateLimitConfig::default(),
            password_reset: PasswordResetConfig {
                token_ttl_minutes: 60,
                reset_url_base: "http://localhost:5173/reset-password".to_string(),
            },
            analytics: AnalyticsConfig::default(),
            mail: MailConfig {
                webhook_url: None,
                from_address: "no-reply@localhost".to_string(),
                timeout_secs: 10,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            },
            rate_limit: RateLimitConfig::default(),
            password_reset: PasswordResetConfig {
                token_ttl_minutes: 60,
                reset_url_base: "https://staging.example.com/reset-password".to_string(),
            },
            analytics: AnalyticsConfig::default(),
            mail: MailConfig {
                webhook_url: None,
                from_address: "no-reply@staging.example.com".to_string(),
                timeout_secs: 10,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            },
            rate_limit: RateLimitConfig::default(),
            password_reset: PasswordResetConfig {
                token_ttl_minutes: 30,
                reset_url_base: "https://app.example.com/reset-password".to_string(),
            },
            analytics: AnalyticsConfig::default(),
            mail: MailConfig {
                webhook_url: None,
                from_address: "no-reply@example.com".to_string(),
                timeout_secs: 10,
            },
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            reset_password_requests: 3,
            reset_password_window_secs: 4 * 60 * 60,
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            write_key: None,
            endpoint: "https://api.segment.io".to_string(),
            timeout_secs: 5,
        }
    }
}

impl AppConfig {
    /// Settings that only development may leave unset.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !matches!(self.environment, Environment::Development) && self.security.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must be set in {:?}", self.environment);
        }
        Ok(())
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
