use super::sync_metadata::SyncMetadataCommand;
use super::sync_registry::SyncRegistryCommand;
use super::{runtime, CommandHandler, CommandResult};
use crate::config::BuildConfig;
use crate::Result;

/// Handler for the `build` command: phase 1, then phase 2
pub struct BuildCommand {
    pub config: BuildConfig,
}

impl BuildCommand {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }
}

impl CommandHandler for BuildCommand {
    fn execute(&self) -> Result<CommandResult> {
        let runtime = runtime()?;
        let metadata = SyncMetadataCommand::new(self.config.clone());
        let registry = SyncRegistryCommand::new(self.config.clone());

        println!("🔄 Syncing metadata under {}", self.config.root.display());
        let synced = runtime.block_on(metadata.run())?;
        let compiled = runtime.block_on(registry.run())?;
        println!(
            "📦 Wrote {} records to {}",
            compiled.records.len(),
            self.config.registry_path().display()
        );

        let message = format!(
            "sync-metadata: {}\nsync-registry: {}",
            synced, compiled.summary
        );
        if synced.has_failures() || compiled.summary.has_failures() {
            Ok(CommandResult::Error(message))
        } else {
            Ok(CommandResult::Success(Some(message)))
        }
    }

    fn name(&self) -> &'static str {
        "build"
    }
}
