//! # nsdispatch
//!
//! Async configuration dispatcher for Citrix NetScaler appliances.
//!
//! The dispatcher retrieves a device's running configuration over two
//! independent transports -- an interactive SSH CLI session and the
//! appliance's management API -- normalizes the output, and persists both
//! results as backup artifacts. Symmetrically, it pushes a merged
//! configuration back over the CLI, aggregating per-leg results into one
//! verdict.
//!
//! ## Features
//!
//! - Async SSH CLI scraping via russh, with timing-mode reads for
//!   commands that return no deterministic prompt
//! - Authenticated HTTPS management-API session with a NetScaler-scoped
//!   relaxed TLS profile
//! - Deterministic line remove/substitute transforms before persistence
//! - One [`TaskOutcome`] per invocation with OR-aggregated failed/changed
//!   flags and stable error codes for dependency and API failures
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use nsdispatch::{
//!     CliProfile, Device, Dispatcher, HttpsApiTransport, SshCliSession, TransformRules,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nsdispatch::Error> {
//!     let device = Device::new("ns1", "192.0.2.10", "nsroot", "secret");
//!
//!     let cli = SshCliSession::new(&device, CliProfile::netscaler())?;
//!     let api = HttpsApiTransport::netscaler();
//!     let mut dispatcher = Dispatcher::new(cli, api);
//!
//!     let rules = TransformRules::empty();
//!     let outcome = dispatcher
//!         .fetch_config(&device, Path::new("backups/ns1.txt"), &rules)
//!         .await?;
//!     println!("{}", outcome.message);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod artifact;
pub mod cli;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod transform;

// Re-export main types for convenience
pub use api::{ApiSession, ApiTransport, CompatTlsProfile, EndpointConfigMap, HttpsApiTransport};
pub use cli::{CliProfile, CliResponse, CliSession, PushResult, SshCliSession, TimingMode};
pub use device::Device;
pub use dispatcher::Dispatcher;
pub use error::{ApiError, Error, TransportError};
pub use outcome::TaskOutcome;
pub use transform::{ProcessedConfig, TransformRules};
