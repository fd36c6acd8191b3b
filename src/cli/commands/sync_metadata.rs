use super::{runtime, CommandHandler, CommandResult};
use crate::catalog::{MetadataSynchronizer, RunSummary};
use crate::config::BuildConfig;
use crate::Result;

/// Handler for the `sync-metadata` command
pub struct SyncMetadataCommand {
    pub config: BuildConfig,
}

impl SyncMetadataCommand {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run phase 1 on an existing runtime
    pub async fn run(&self) -> Result<RunSummary> {
        MetadataSynchronizer::new(self.config.clone())?
            .sync_all()
            .await
    }
}

impl CommandHandler for SyncMetadataCommand {
    fn execute(&self) -> Result<CommandResult> {
        println!("🔄 Syncing metadata under {}", self.config.root.display());
        let summary = runtime()?.block_on(self.run())?;
        Ok(CommandResult::from_summary(self.name(), &summary))
    }

    fn name(&self) -> &'static str {
        "sync-metadata"
    }
}
