pub mod profile;
pub mod reset_token;
pub mod theme;
pub mod user;

pub use profile::ProfileRow;
pub use reset_token::ResetTokenRow;
pub use theme::ThemeRow;
pub use user::UserRow;
