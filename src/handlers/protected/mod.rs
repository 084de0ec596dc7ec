// handlers/protected/mod.rs - Protected handlers
//
// Every route here sits behind `require_auth` and reads the caller from the
// `AuthUser` extension.

pub mod theme;
pub mod user;
