use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// blockreg: annotation sync and registry compiler for UI block catalogs
#[derive(Parser, Debug)]
#[command(name = "blockreg")]
#[command(version)]
#[command(about = "Sync block annotations and compile the block registry")]
#[command(
    long_about = "blockreg keeps each block folder's metadata.json in step with the variant files on disk, keyed by inode, and compiles every folder into one sorted registry.json."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Component tree root (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file path (defaults to ./blockreg.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Set log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite every block folder's metadata.json from the files on disk
    SyncMetadata,

    /// Compile all metadata.json files into registry.json
    SyncRegistry,

    /// Run sync-metadata, then sync-registry
    Build,

    /// Filter the compiled registry
    Query(QueryArgs),
}

/// Filters for the `query` command; unset filters match everything
#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub block: Option<String>,

    #[arg(long)]
    pub variant: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// Require a folder tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Require an element (repeatable)
    #[arg(long = "element")]
    pub elements: Vec<String>,

    /// Only bookmarked variants
    #[arg(long)]
    pub bookmarked: bool,

    /// Created on or after (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub from: Option<String>,

    /// Created on or before this day, in the offset given (defaults to today when --from is set)
    #[arg(long)]
    pub to: Option<String>,

    /// Sort by creation date (asc, desc)
    #[arg(long, default_value = "desc")]
    pub order: String,

    /// Maximum number of records to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output records as JSON
    #[arg(long)]
    pub json: bool,
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::SyncMetadata => "sync-metadata",
            Commands::SyncRegistry => "sync-registry",
            Commands::Build => "build",
            Commands::Query(_) => "query",
        }
    }

    /// Check if this command modifies files
    pub fn modifies_files(&self) -> bool {
        !matches!(self, Commands::Query(_))
    }
}
