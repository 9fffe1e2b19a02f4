//! Error types for nsdispatch.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for dispatcher operations.
#[derive(Error, Debug)]
pub enum Error {
    /// CLI transport errors (SSH connection, authentication, timeouts)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Management API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Transform rule compilation errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Artifact write errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] io::Error),

    /// Endpoint map serialization errors
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// CLI transport layer errors (SSH connection, authentication, channel).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Session not opened yet
    #[error("Session not connected - call open() first")]
    NotConnected,

    /// Failed to open the PTY channel or request a shell
    #[error("Failed to open interactive channel")]
    ChannelOpenFailed,

    /// Channel closed before the command completed
    #[error("Channel closed")]
    Closed,

    /// No output arrived within the timeout
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The device prompt was not seen within the timeout
    #[error("Prompt not found within {0:?}")]
    PromptTimeout(Duration),

    /// Invalid prompt pattern in the platform profile
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Management API errors.
///
/// The dependency, authentication, and endpoint failures carry the stable
/// error codes consumed downstream (`E1020`, `E1021`, `E1022`); use
/// [`ApiError::code`] to branch on failure kind without parsing messages.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API client capability is absent in this environment
    #[error("[E1020] management API client is unavailable in this environment")]
    DependencyMissing,

    /// The device rejected the API credentials
    #[error("[E1021] API authentication to {host} failed: {reason}")]
    Authentication { host: String, reason: String },

    /// A single configuration endpoint could not be read
    #[error("[E1022] failed to fetch endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    /// Network-level failure establishing the API session
    #[error("API connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device base URL could not be constructed
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS profile or client construction failure
    #[error("TLS error: {0}")]
    Tls(String),

    /// The device returned no configuration data at all
    #[error("API returned an empty configuration map")]
    EmptyConfig,
}

impl ApiError {
    /// Stable error code for this failure, if one is defined.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::DependencyMissing => Some("E1020"),
            Self::Authentication { .. } => Some("E1021"),
            Self::Endpoint { .. } => Some("E1022"),
            _ => None,
        }
    }
}

/// Transform rule errors.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A remove or substitute rule is not a valid regex
    #[error("Invalid rule pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type alias using nsdispatch's Error.
pub type Result<T> = std::result::Result<T, Error>;
