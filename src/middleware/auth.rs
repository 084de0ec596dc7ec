use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::User;

/// The caller resolved from the bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Validates the bearer token, loads its user and attaches it as [`AuthUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = state.signer.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let user = match state.users.get_user_by_email(&claims.email).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            tracing::warn!("Token presented for unknown account");
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }
        Err(e) => return Err(e),
    };

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
