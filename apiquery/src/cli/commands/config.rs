//! config show / set

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use apiquery::config::{ClientConfig, FileSession};

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration (file + environment)
    Show,
    /// Set a value in the config file
    Set {
        /// base_url, api_prefix, refresh_path, timeout_secs or refresh_mode
        key: String,
        value: String,
    },
}

pub fn handle_config(
    action: Option<ConfigCommands>,
    effective: &ClientConfig,
    path: &Path,
    session: &FileSession,
) -> Result<()> {
    match action.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            let rendered =
                toml::to_string_pretty(effective).context("Failed to render configuration")?;
            println!("{} {}", "Config file:".bold(), path.display());
            println!("{} {}", "Session file:".bold(), session.path().display());
            println!(
                "{} {}",
                "Signed in:".bold(),
                if session.is_signed_in() {
                    "yes".bright_green()
                } else {
                    "no".yellow()
                }
            );
            println!("{} {}", "Base path:".bold(), effective.base_path().cyan());
            println!();
            print!("{}", rendered);
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            // Only the file is edited; environment overrides stay out of it.
            let mut stored = ClientConfig::load_from(path)?;
            stored.set(&key, &value)?;
            stored.save_to(path)?;
            println!("{} {} = {}", "✓".bright_green(), key.bold(), value);
            Ok(())
        }
    }
}
