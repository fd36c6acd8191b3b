use super::{runtime, CommandHandler, CommandResult};
use crate::catalog::{CompiledRegistry, RegistryCompiler};
use crate::config::BuildConfig;
use crate::Result;

/// Handler for the `sync-registry` command
pub struct SyncRegistryCommand {
    pub config: BuildConfig,
}

impl SyncRegistryCommand {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run phase 2 on an existing runtime
    pub async fn run(&self) -> Result<CompiledRegistry> {
        RegistryCompiler::new(self.config.clone())?
            .compile_and_write()
            .await
    }
}

impl CommandHandler for SyncRegistryCommand {
    fn execute(&self) -> Result<CommandResult> {
        let compiled = runtime()?.block_on(self.run())?;
        println!(
            "📦 Wrote {} records to {}",
            compiled.records.len(),
            self.config.registry_path().display()
        );
        Ok(CommandResult::from_summary(self.name(), &compiled.summary))
    }

    fn name(&self) -> &'static str {
        "sync-registry"
    }
}
