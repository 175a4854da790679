//! Process exit status
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: every requested report type completed |
//! | 1 | Failure: at least one report type (or the command itself) failed |
//!
//! Unmatched records are not failures; they end up in the review file.

use std::process;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    /// Exit code for a batch with `count` failed parts
    pub fn from_failure_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get the numeric value
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}
