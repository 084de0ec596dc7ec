pub mod profile_service;
pub mod theme_service;
pub mod user_service;

pub use profile_service::{PgProfileService, ProfileService};
pub use theme_service::{PgThemeService, ThemeService};
pub use user_service::{NewUser, PgUserService, UserService};
