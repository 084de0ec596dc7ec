//! Row to domain conversion. Nothing outside the services sees a `*Row`.

use crate::database::models::{ProfileRow, ThemeRow, UserRow};
use crate::types::{Profile, Theme, User};

impl From<ThemeRow> for Theme {
    fn from(row: ThemeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            label: row.label,
            colors: row.colors.0,
            custom_css: row.custom_css,
            custom_html: row.custom_html,
            global: row.global,
            created_at: row.created_at,
        }
    }
}

impl From<UserRow> for User {
    // password_hash stops here
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            active_profile_id: row.active_profile_id,
            created_at: row.created_at,
        }
    }
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            handle: row.handle,
            created_at: row.created_at,
        }
    }
}
