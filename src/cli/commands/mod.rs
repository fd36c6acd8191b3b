pub mod build;
pub mod query;
pub mod sync_metadata;
pub mod sync_registry;

use crate::catalog::RunSummary;
use crate::{RegistryError, Result};

/// Common trait for all command handlers
pub trait CommandHandler {
    /// Execute the command
    fn execute(&self) -> Result<CommandResult>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}

/// Command execution result
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Success with optional message
    Success(Option<String>),
    /// Some units failed; output was still written
    Error(String),
}

impl CommandResult {
    /// Convert to exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandResult::Success(_) => 0,
            CommandResult::Error(_) => 1,
        }
    }

    /// Get message if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandResult::Success(msg) => msg.as_deref(),
            CommandResult::Error(msg) => Some(msg),
        }
    }

    /// Map a phase summary to a result: any failed folder is an error
    pub fn from_summary(phase: &str, summary: &RunSummary) -> Self {
        let message = format!("{phase}: {summary}");
        if summary.has_failures() {
            CommandResult::Error(message)
        } else {
            CommandResult::Success(Some(message))
        }
    }
}

/// Multi-threaded runtime for the parallel build phases
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| RegistryError::Task(format!("Failed to start runtime: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_summary_exit_codes() {
        let mut summary = RunSummary::default();
        summary.record_success(PathBuf::from("/c/a"));
        let ok = CommandResult::from_summary("sync-metadata", &summary);
        assert_eq!(ok.exit_code(), 0);
        assert_eq!(ok.message(), Some("sync-metadata: 1 folder(s) ok, 0 failed"));

        summary.record_failure(PathBuf::from("/c/b"), "boom");
        let failed = CommandResult::from_summary("sync-metadata", &summary);
        assert_eq!(failed.exit_code(), 1);
    }
}
