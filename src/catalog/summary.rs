use std::fmt;
use std::path::PathBuf;

/// A block folder that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub folder: PathBuf,
    pub error: String,
}

/// End-of-run report shared by both phases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Folders processed successfully, sorted
    pub succeeded: Vec<PathBuf>,
    /// Folders skipped because of an error, sorted
    pub failures: Vec<UnitFailure>,
}

impl RunSummary {
    pub fn record_success(&mut self, folder: PathBuf) {
        self.succeeded.push(folder);
    }

    pub fn record_failure(&mut self, folder: PathBuf, error: impl fmt::Display) {
        self.failures.push(UnitFailure {
            folder,
            error: error.to_string(),
        });
    }

    /// Sort both lists so reports do not depend on task completion order
    pub fn finish(mut self) -> Self {
        self.succeeded.sort();
        self.failures.sort_by(|a, b| a.folder.cmp(&b.folder));
        self
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} folder(s) ok, {} failed",
            self.succeeded.len(),
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {}: {}", failure.folder.display(), failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finish_sorts_and_display_lists_failures() {
        let mut summary = RunSummary::default();
        summary.record_success(PathBuf::from("/c/b"));
        summary.record_success(PathBuf::from("/c/a"));
        summary.record_failure(PathBuf::from("/c/z"), "bad json");
        let summary = summary.finish();

        assert_eq!(
            summary.succeeded,
            vec![PathBuf::from("/c/a"), PathBuf::from("/c/b")]
        );
        assert!(summary.has_failures());
        assert_eq!(
            summary.to_string(),
            "2 folder(s) ok, 1 failed\n  - /c/z: bad json"
        );
    }
}
