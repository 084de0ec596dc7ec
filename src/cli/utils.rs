use serde_json::json;

use crate::cli::OutputFormat;
use crate::types::Theme;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "message": message
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

pub fn output_theme(output_format: OutputFormat, theme: &Theme) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(theme)?),
        OutputFormat::Text => println!("{}", theme_summary(theme)),
    }
    Ok(())
}

fn theme_summary(theme: &Theme) -> String {
    let owner = theme
        .user_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    let visibility = if theme.global { "global" } else { "private" };
    format!("✓ {} '{}' ({}, owner {})", theme.id, theme.label, visibility, owner)
}
