//! Result types for CLI commands.

use std::path::PathBuf;

use survey_model::{ColumnDefinition, SurveyId};
use survey_table::{BatchErrors, SaveReport};

#[derive(Debug)]
pub struct ValidateResult {
    pub source: PathBuf,
    pub survey: SurveyId,
    pub staged: usize,
    /// Set when the batch was committed.
    pub report: Option<SaveReport>,
    /// Errors of a rejected batch; empty when committed.
    pub errors: BatchErrors,
    /// Active columns at save time.
    pub columns: Vec<ColumnDefinition>,
    pub output: Option<PathBuf>,
}

impl ValidateResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
