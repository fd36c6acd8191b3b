use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use blockreg::{
    cli::commands::{
        build::BuildCommand, query::QueryCommand, sync_metadata::SyncMetadataCommand,
        sync_registry::SyncRegistryCommand, CommandHandler,
    },
    cli::{Cli, Commands, LogLevel},
    config::ConfigLoader,
};

/// Initialize tracing from the --log-level flag; RUST_LOG adds directives
fn initialize_tracing(log_level: LogLevel) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());
    if let Ok(extra) = std::env::var("RUST_LOG") {
        for directive in extra.split(',').filter_map(|d| d.parse().ok()) {
            filter = filter.add_directive(directive);
        }
    }

    // Logs go to stderr so `query --json` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    let config = ConfigLoader::new()
        .with_config_file(cli.config)
        .with_root(cli.root)
        .load()?;
    debug!(
        writes_files = cli.command.modifies_files(),
        "Running {} with root {}",
        cli.command.name(),
        config.root.display()
    );

    let handler: Box<dyn CommandHandler> = match cli.command {
        Commands::SyncMetadata => Box::new(SyncMetadataCommand::new(config)),
        Commands::SyncRegistry => Box::new(SyncRegistryCommand::new(config)),
        Commands::Build => Box::new(BuildCommand::new(config)),
        Commands::Query(args) => Box::new(QueryCommand::new(config, args)),
    };

    let result = handler.execute()?;
    if let Some(message) = result.message() {
        if result.exit_code() == 0 {
            println!("✅ {message}");
        } else {
            eprintln!("⚠️  {message}");
        }
    }

    std::process::exit(result.exit_code());
}
