//! Request commands: get, post, put, patch, delete

pub mod handler;

use std::path::PathBuf;

use clap::{Args, ValueEnum};

pub use handler::{handle_body, handle_delete, handle_get};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    Compact,
    /// CSV of the response's `data` items (or of the body itself)
    Csv,
}

/// Flags shared by every request command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Extra header, `Name: value`; repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Extra query parameter, `key=value`; repeatable
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write the response to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Path below the API prefix, e.g. `users`
    pub path: String,

    /// Filter (`where` section) as JSON
    #[arg(short = 'w', long = "where", value_name = "JSON")]
    pub filter: Option<String>,

    /// Ordering as `field:asc|desc`; repeatable, applied in order
    #[arg(long = "order", value_name = "FIELD:DIR")]
    pub order: Vec<String>,

    /// Zero-based page index
    #[arg(long, conflicts_with = "cursor")]
    pub page: Option<u32>,

    /// Opaque cursor returned by a previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Page size used with --page or --cursor
    #[arg(long, default_value_t = 25)]
    pub size: u32,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BodyArgs {
    /// Path below the API prefix
    pub path: String,

    /// JSON body
    #[arg(short, long, value_name = "JSON", conflicts_with = "file")]
    pub data: Option<String>,

    /// Read the JSON body from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Path below the API prefix
    pub path: String,

    #[command(flatten)]
    pub common: CommonArgs,
}
