//! Response type for CLI command execution.

use std::time::Duration;

/// Response from one CLI command.
#[derive(Debug, Clone)]
pub struct CliResponse {
    /// The command that was executed.
    pub command: String,

    /// The command output (command echo and trailing prompt removed).
    pub result: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the output matched a failure marker.
    pub failure_message: Option<String>,
}

impl CliResponse {
    /// Create a successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Create a delivered-but-failed response.
    pub fn failed(
        command: impl Into<String>,
        result: impl Into<String>,
        elapsed: Duration,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            elapsed,
            failure_message: Some(failure_message.into()),
        }
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Check if the output is empty (whitespace only).
    pub fn is_empty(&self) -> bool {
        self.result.trim().is_empty()
    }
}

impl std::fmt::Display for CliResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}
