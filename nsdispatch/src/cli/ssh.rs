//! SSH-backed CLI session using russh.
//!
//! Opens a PTY + shell on the appliance and scrapes command output,
//! either until the prompt pattern matches (prompt mode) or until output
//! goes quiet (timing mode).

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use log::{debug, warn};
use regex::bytes::Regex;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::platform::CliProfile;
use super::response::CliResponse;
use super::{CliSession, PushResult, TimingMode};
use crate::device::Device;
use crate::error::{Result, TransportError};

/// Base read interval scaled by the timing-mode delay factor.
const TIMING_BASE: Duration = Duration::from_millis(200);

/// Only the tail of the accumulation buffer is searched for the prompt.
const PROMPT_SEARCH_DEPTH: usize = 1000;

/// Interactive SSH session to one appliance.
///
/// The platform profile is fixed at construction; the session speaks one
/// device family's syntax for its whole lifetime.
pub struct SshCliSession {
    profile: CliProfile,
    prompt: Regex,
    host: String,
    port: u16,
    username: String,
    password: secrecy::SecretString,
    timeout: Duration,
    session: Option<Handle<ClientHandler>>,
    channel: Option<Channel<Msg>>,
}

impl SshCliSession {
    /// Create a session for the given device. Does not connect; call
    /// [`open`](Self::open) first.
    pub fn new(device: &Device, profile: CliProfile) -> Result<Self> {
        let prompt = Regex::new(&profile.prompt_pattern).map_err(TransportError::InvalidPattern)?;
        Ok(Self {
            prompt,
            host: device.hostname.clone(),
            port: 22,
            username: device.username.clone(),
            password: device.password.clone(),
            timeout: Duration::from_secs(30),
            session: None,
            channel: None,
            profile,
        })
    }

    /// Set the SSH port (default: 22).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the transport timeout (default: 30s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connect, authenticate, and open the interactive shell.
    pub async fn open(&mut self) -> Result<()> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(self.timeout),
            ..Default::default()
        });

        let mut session = tokio::time::timeout(
            self.timeout,
            client::connect(config, (self.host.as_str(), self.port), ClientHandler),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))?
        .map_err(TransportError::Ssh)?;

        let authenticated = session
            .authenticate_password(&self.username, self.password.expose_secret())
            .await
            .map_err(TransportError::Ssh)?
            .success();
        if !authenticated {
            return Err(TransportError::AuthenticationFailed {
                user: self.username.clone(),
            }
            .into());
        }

        let channel = session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_pty(true, "xterm", 511, 24, 0, 0, &[])
            .await
            .map_err(|_| TransportError::ChannelOpenFailed)?;
        channel
            .request_shell(true)
            .await
            .map_err(|_| TransportError::ChannelOpenFailed)?;

        self.session = Some(session);
        self.channel = Some(channel);

        // Drain the login banner and initial prompt.
        self.read_until_quiet(1).await?;
        debug!("CLI session open to {}:{}", self.host, self.port);
        Ok(())
    }

    /// Close the shell and disconnect.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            channel.eof().await.ok();
        }
        if let Some(session) = self.session.take() {
            session
                .disconnect(russh::Disconnect::ByApplication, "", "en")
                .await
                .map_err(TransportError::Ssh)?;
        }
        Ok(())
    }

    /// Check if the session is open.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    fn channel_mut(&mut self) -> std::result::Result<&mut Channel<Msg>, TransportError> {
        self.channel.as_mut().ok_or(TransportError::NotConnected)
    }

    async fn send_line(&mut self, command: &str) -> Result<()> {
        let line = format!("{command}\n");
        self.channel_mut()?
            .data(line.as_bytes())
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }

    /// Read until the prompt pattern matches the buffer tail.
    async fn read_until_prompt(&mut self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        let mut buffer = BytesMut::with_capacity(4096);

        loop {
            let start = buffer.len().saturating_sub(PROMPT_SEARCH_DEPTH);
            if self.prompt.is_match(&buffer[start..]) {
                return Ok(buffer.to_vec());
            }

            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(TransportError::PromptTimeout(self.timeout))?;

            let channel = self.channel.as_mut().ok_or(TransportError::NotConnected)?;
            match tokio::time::timeout(remaining, channel.wait()).await {
                Ok(Some(ChannelMsg::Data { data })) => buffer.extend_from_slice(&data),
                Ok(Some(ChannelMsg::ExtendedData { data, .. })) => {
                    buffer.extend_from_slice(&data);
                }
                Ok(Some(ChannelMsg::Eof)) | Ok(None) => {
                    return Err(TransportError::Closed.into());
                }
                Ok(Some(_)) => {}
                Err(_) => return Err(TransportError::PromptTimeout(self.timeout).into()),
            }
        }
    }

    /// Read until output stays quiet for `delay_factor` base intervals.
    ///
    /// Used for commands that never return a deterministic prompt. The
    /// transport timeout caps the whole read: the remaining budget is
    /// recomputed on every pass, so a device that keeps chattering in
    /// bursts shorter than the quiet window still times out once the
    /// deadline passes.
    async fn read_until_quiet(&mut self, delay_factor: u32) -> Result<Vec<u8>> {
        let quiet_window = TIMING_BASE * delay_factor.max(1);
        let deadline = Instant::now() + self.timeout;
        let mut buffer = BytesMut::with_capacity(4096);

        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(TransportError::Timeout(self.timeout))?;

            let channel = self.channel.as_mut().ok_or(TransportError::NotConnected)?;
            match tokio::time::timeout(quiet_window.min(remaining), channel.wait()).await {
                Ok(Some(ChannelMsg::Data { data })) => buffer.extend_from_slice(&data),
                Ok(Some(ChannelMsg::ExtendedData { data, .. })) => {
                    buffer.extend_from_slice(&data);
                }
                Ok(Some(ChannelMsg::Eof)) | Ok(None) => break,
                Ok(Some(_)) => {}
                Err(_) => match quiet_step(remaining, quiet_window, !buffer.is_empty()) {
                    QuietStep::Finished => break,
                    QuietStep::TimedOut => {
                        return Err(TransportError::Timeout(self.timeout).into());
                    }
                    QuietStep::KeepReading => {}
                },
            }
        }

        Ok(buffer.to_vec())
    }

    /// Strip the command echo and trailing prompt from raw output.
    fn normalize(&self, raw: &[u8], command: &str) -> String {
        let text = String::from_utf8_lossy(raw);
        let mut lines: Vec<&str> = text.lines().collect();

        if lines.first().is_some_and(|l| l.trim() == command.trim()) {
            lines.remove(0);
        }
        while lines
            .last()
            .is_some_and(|l| self.prompt.is_match(l.as_bytes()) || l.trim().is_empty())
        {
            lines.pop();
        }

        lines.join("\n")
    }
}

impl CliSession for SshCliSession {
    fn profile(&self) -> &CliProfile {
        &self.profile
    }

    async fn run_command(&mut self, command: &str, mode: TimingMode) -> Result<CliResponse> {
        if !self.is_open() {
            self.open().await?;
        }

        let start = Instant::now();
        self.send_line(command).await?;

        let raw = match mode {
            TimingMode::Prompt => self.read_until_prompt().await?,
            TimingMode::Timing { delay_factor } => self.read_until_quiet(delay_factor).await?,
        };

        let result = self.normalize(&raw, command);
        let elapsed = start.elapsed();

        if self.profile.contains_failure_marker(&result) {
            warn!("command '{command}' on {} reported a failure", self.host);
            return Ok(CliResponse::failed(
                command,
                result,
                elapsed,
                "device output matched a failure marker",
            ));
        }
        Ok(CliResponse::new(command, result, elapsed))
    }

    async fn push_config(&mut self, lines: &[String]) -> Result<PushResult> {
        if !self.is_open() {
            self.open().await?;
        }

        let mut outputs = Vec::with_capacity(lines.len());
        let mut changed = false;

        for line in lines {
            self.send_line(line).await?;
            let raw = self.read_until_prompt().await?;
            let result = self.normalize(&raw, line);
            if !self.profile.contains_failure_marker(&result) {
                changed = true;
            }
            outputs.push(result);
        }

        let output = outputs.join("\n");
        let failed = self.profile.contains_failure_marker(&output);
        Ok(PushResult {
            output,
            changed,
            failed,
        })
    }
}

/// What to do when a timing-mode read window elapses with no new data.
#[derive(Debug, PartialEq, Eq)]
enum QuietStep {
    /// Output went quiet for a full window; the command is done.
    Finished,

    /// The transport deadline cut the window short; the read failed.
    TimedOut,

    /// Nothing has arrived yet and budget remains; keep waiting.
    KeepReading,
}

fn quiet_step(remaining: Duration, quiet_window: Duration, have_output: bool) -> QuietStep {
    if remaining <= quiet_window {
        QuietStep::TimedOut
    } else if have_output {
        QuietStep::Finished
    } else {
        QuietStep::KeepReading
    }
}

/// russh client handler.
///
/// Host key checking is disabled: appliance fleets regenerate host keys
/// on firmware resets and the inventory system does not track them.
struct ClientHandler;

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}
