//! CLI commands and argument parsing

use crate::query::DEFAULT_PAGE_SIZE;
use crate::session::DEFAULT_QUERY_PATH;
use crate::auth::DEFAULT_LOGIN_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Export schema records from a campaign server to local files
#[derive(Parser, Debug)]
#[command(name = "campaign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Export configuration file (JSON or YAML); `queryDef` entries may not
    /// set `operation` or `startLine`
    #[arg(short = 'C', long, global = true, default_value = "campaign.json")]
    pub config: PathBuf,

    /// Server URL
    #[arg(short, long, global = true, env = "CAMPAIGN_SERVER")]
    pub server: Option<String>,

    /// User name
    #[arg(short, long, global = true, env = "CAMPAIGN_USER")]
    pub user: Option<String>,

    /// Password
    #[arg(long, global = true, env = "CAMPAIGN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Bearer token (takes precedence over user and password)
    #[arg(long, global = true, env = "CAMPAIGN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// How user and password are presented to the server
    #[arg(long, global = true, default_value = "session")]
    pub auth: AuthMode,

    /// Login endpoint, relative to the server URL
    #[arg(long, global = true, default_value = DEFAULT_LOGIN_PATH)]
    pub login_path: String,

    /// Query endpoint, relative to the server URL
    #[arg(long, global = true, default_value = DEFAULT_QUERY_PATH)]
    pub query_path: String,

    /// Records requested per page
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    /// Archive every request and response below this directory
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,

    /// Restrict the run to this schema (repeatable)
    #[arg(long = "schema", global = true)]
    pub schemas: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count records per schema and require an empty destination
    Check {
        /// Destination directory
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Export every record of every schema to its own file
    Pull {
        /// Destination directory
        #[arg(short, long)]
        path: PathBuf,

        /// Fail if the destination exists and is not empty
        #[arg(long)]
        require_empty: bool,
    },

    /// List configured schemas
    Schemas,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON output (one message per line)
    Json,
}

/// Credential presentation for user and password
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AuthMode {
    /// Log in once and send the session token on every call
    Session,
    /// HTTP Basic authentication on every call
    Basic,
}
