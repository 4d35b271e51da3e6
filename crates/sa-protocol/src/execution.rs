//! Outcome of running one script.

use std::time::Duration;

/// Captured result of a script execution.
///
/// A non-zero `exit_code` is ordinary data, not a failure. `exit_code` is
/// `None` when the process was killed, either by the runner on timeout or by
/// a signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration: Duration,
}

impl ExecutionResult {
    /// True when the process ran to completion and exited with status 0.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}
