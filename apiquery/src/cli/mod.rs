//! Command-line surface of the `apiquery` binary

pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::Method;

use apiquery::api::{ApiClient, SessionContext};
use apiquery::config::{ClientConfig, FileSession};
use commands::auth::LoginArgs;
use commands::config::ConfigCommands;
use commands::request::{BodyArgs, DeleteArgs, GetArgs};

#[derive(Parser, Debug)]
#[command(
    name = "apiquery",
    version,
    about = "Query and call a REST back-end with typed filters and automatic token refresh"
)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file to use instead of ~/.config/apiquery/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET a resource, optionally with a listing query
    Get(GetArgs),
    /// POST a JSON body
    Post(BodyArgs),
    /// PUT a JSON body
    Put(BodyArgs),
    /// PATCH a JSON body
    Patch(BodyArgs),
    /// DELETE a resource
    Delete(DeleteArgs),
    /// Store access and refresh tokens
    Login(LoginArgs),
    /// Forget the stored tokens
    Logout,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

/// Configuration and session the request commands run with.
struct Context {
    config: ClientConfig,
    session: Arc<FileSession>,
}

impl Context {
    fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => ClientConfig::load_from(path)?,
            None => ClientConfig::load_from(&ClientConfig::default_path())?,
        };
        config.apply_env()?;

        let session = Arc::new(FileSession::open(FileSession::default_path())?);
        Ok(Self { config, session })
    }

    fn client(&self) -> Result<ApiClient> {
        self.config.ensure_base_url()?;
        ApiClient::from_config(&self.config, SessionContext::from_shared(self.session.clone()))
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let context = Context::load(cli.config.as_ref())?;

    match cli.command {
        Commands::Get(args) => commands::request::handle_get(&context.client()?, args).await,
        Commands::Post(args) => {
            commands::request::handle_body(&context.client()?, Method::POST, args).await
        }
        Commands::Put(args) => {
            commands::request::handle_body(&context.client()?, Method::PUT, args).await
        }
        Commands::Patch(args) => {
            commands::request::handle_body(&context.client()?, Method::PATCH, args).await
        }
        Commands::Delete(args) => commands::request::handle_delete(&context.client()?, args).await,
        Commands::Login(args) => commands::auth::handle_login(&context.session, args),
        Commands::Logout => commands::auth::handle_logout(&context.session),
        Commands::Config { action } => {
            let path = cli.config.unwrap_or_else(ClientConfig::default_path);
            commands::config::handle_config(action, &context.config, &path, &context.session)
        }
    }
}
