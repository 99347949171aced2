mod cli;

use clap::Parser;
use colored::*;
use log::LevelFilter;

use apiquery::ApiError;
use cli::Cli;

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = cli::run(cli).await {
        match e.downcast_ref::<ApiError>() {
            Some(api) => eprintln!("{} ({}): {}", "Error".red().bold(), api.status, api.message),
            None => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}
