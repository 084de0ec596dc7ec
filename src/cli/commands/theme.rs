use anyhow::Context;
use clap::Subcommand;
use uuid::Uuid;

use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;
use crate::services::{PgThemeService, ThemeService};

#[derive(Subcommand)]
pub enum ThemeCommands {
    #[command(about = "Make a theme visible to every user, or private again")]
    SetGlobal {
        #[arg(help = "Theme ID")]
        theme_id: Uuid,
        #[arg(help = "true or false", action = clap::ArgAction::Set)]
        global: bool,
    },

    #[command(about = "Transfer a theme to another user")]
    SetOwner {
        #[arg(help = "Theme ID")]
        theme_id: Uuid,
        #[arg(help = "New owner's user ID")]
        user_id: Uuid,
    },
}

pub async fn handle(cmd: ThemeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to database")?;
    let themes = PgThemeService::new(pool);

    let theme = match cmd {
        ThemeCommands::SetGlobal { theme_id, global } => themes.set_global(theme_id, global).await?,
        ThemeCommands::SetOwner { theme_id, user_id } => themes.set_user_id(theme_id, user_id).await?,
    };

    utils::output_theme(output_format, &theme)
}
