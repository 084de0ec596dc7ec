// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (bearer token, `AuthUser` attached)

pub mod protected;
pub mod public;

use crate::error::{ApiError, ApiResult};

/// Missing and blank fields are both rejected.
pub(crate) fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("Missing required field: {field}"))),
    }
}
