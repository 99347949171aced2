//! login / logout

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;

use apiquery::api::Credentials;
use apiquery::config::FileSession;

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Access (JWT) token; prompted for when omitted
    #[arg(long, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Refresh token; prompted for when omitted
    #[arg(long, value_name = "TOKEN")]
    pub refresh_token: Option<String>,
}

fn prompt_secret(prompt: &str) -> Result<String> {
    let value = rpassword::prompt_password(prompt).context("Failed to read token")?;
    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("Token cannot be empty");
    }
    Ok(value)
}

pub fn handle_login(session: &FileSession, args: LoginArgs) -> Result<()> {
    let access_token = match args.access_token {
        Some(token) => token,
        None => prompt_secret("Access token: ")?,
    };
    let refresh_token = match args.refresh_token {
        Some(token) => token,
        None => prompt_secret("Refresh token: ")?,
    };

    session.store(Credentials::new(access_token, refresh_token))?;
    println!(
        "{} Session stored in {}",
        "✓".bright_green(),
        session.path().display().to_string().cyan()
    );
    Ok(())
}

pub fn handle_logout(session: &FileSession) -> Result<()> {
    if !session.is_signed_in() {
        println!("{}", "Not signed in.".dimmed());
        return Ok(());
    }

    session.clear()?;
    println!("{} Signed out", "✓".bright_green());
    Ok(())
}
