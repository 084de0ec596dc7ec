// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, registration and the password reset flow, plus the
// service endpoints.

pub mod service;
pub mod user;
