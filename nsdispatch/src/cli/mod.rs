//! Interactive CLI session adapter.
//!
//! The CLI leg drives the appliance through an SSH shell session. The
//! [`CliSession`] trait is the seam the dispatcher orchestrates against;
//! [`SshCliSession`] is the concrete russh-backed realization.

mod platform;
mod response;
mod ssh;

pub use platform::{
    CliProfile, DEFAULT_DELAY_FACTOR, NETSCALER_CONFIG_COMMAND, NETSCALER_PLATFORM,
};
pub use response::CliResponse;
pub use ssh::SshCliSession;

use std::future::Future;

use crate::error::Result;

/// How to decide that a command's output is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    /// Wait for the platform prompt pattern to appear.
    Prompt,

    /// Wait for output to go quiet instead of for a prompt. The quiet
    /// window scales with `delay_factor`. Required for commands whose
    /// output ends without a deterministic prompt (the NetScaler backup
    /// export does this).
    Timing {
        /// Multiplier applied to the base read interval.
        delay_factor: u32,
    },
}

/// Result of pushing one command block to the device.
///
/// A content-level failure (a failure marker in the device's response) is
/// recorded here, never raised: the caller needs the full raw output for
/// diagnosis even when part of the push failed.
#[derive(Debug, Clone)]
pub struct PushResult {
    /// Combined raw device output for the block, in command order.
    pub output: String,

    /// True once the device accepted at least one command.
    pub changed: bool,

    /// True if the output contains a failure marker.
    pub failed: bool,
}

/// Trait for interactive CLI sessions.
///
/// The session's platform identity (command syntax, prompt pattern,
/// failure markers) is fixed at construction via [`CliProfile`] rather
/// than mutated per call.
pub trait CliSession: Send {
    /// The platform profile this session was built with.
    fn profile(&self) -> &CliProfile;

    /// Run a single command and return its output.
    ///
    /// Transport failures (connect, auth, timeout) are returned as
    /// errors; a command whose output carries a failure marker comes back
    /// as a delivered-but-failed [`CliResponse`].
    fn run_command(
        &mut self,
        command: &str,
        mode: TimingMode,
    ) -> impl Future<Output = Result<CliResponse>> + Send;

    /// Push a block of configuration commands line by line.
    ///
    /// Only transport failures are errors; content failures are folded
    /// into the returned [`PushResult`].
    fn push_config(&mut self, lines: &[String]) -> impl Future<Output = Result<PushResult>> + Send;
}
