//! Route table. User and theme paths accept any method.

use axum::{
    http::HeaderValue,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{require_auth, reset_rate_limit_middleware};
use crate::state::AppState;

pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(reset_routes(state.clone()))
        .merge(protected_routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors_layer(security) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn public_routes() -> Router<AppState> {
    use public::{service, user};

    Router::new()
        .route("/", get(service::root))
        .route("/health", get(service::health))
        .route("/user/login", any(user::login))
        .route("/user/create", any(user::create))
        .route("/user/reset-password", any(user::reset_password))
}

fn reset_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/user/request-reset-password",
            any(public::user::request_reset_password),
        )
        .route_layer(middleware::from_fn_with_state(state, reset_rate_limit_middleware))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{theme, user};

    Router::new()
        .route("/user", any(user::me))
        .route("/user/update", any(user::update))
        .route("/user/delete", any(user::delete))
        .route("/user/data-package", any(user::data_package))
        .route("/user/set-active-profile", any(user::set_active_profile))
        .route("/theme/list", any(theme::list))
        .route("/theme/create", any(theme::create))
        .route("/theme/update", any(theme::update))
        .route("/theme/delete", any(theme::delete))
        .route("/theme/:id", any(theme::get))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
