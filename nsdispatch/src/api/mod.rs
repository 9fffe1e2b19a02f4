//! Management API session adapter.
//!
//! The API leg reads the appliance's configuration category by category
//! over an authenticated HTTPS session. [`ApiTransport`] and
//! [`ApiSession`] are the seams the dispatcher orchestrates against;
//! [`HttpsApiTransport`] is the concrete reqwest-backed realization.

mod client;
mod tls;

pub use client::{HttpsApiSession, HttpsApiTransport};
pub use tls::{CompatTlsProfile, NETSCALER_CIPHER_LIST};

use std::future::Future;

use indexmap::IndexMap;
use serde_json::Value;

use crate::device::Device;
use crate::error::ApiError;

/// The fixed, ordered list of configuration endpoints read during a
/// fetch. Output maps follow this order for determinism.
pub const CONFIG_ENDPOINTS: [&str; 8] = [
    "/system/identity",
    "/user",
    "/interface",
    "/ip/address",
    "/system/ntp/client",
    "/ip/dns",
    "/snmp/community",
    "/system/logging/action",
];

/// Ordered mapping from endpoint path to the raw structured data the
/// device returned for it.
pub type EndpointConfigMap = IndexMap<String, Value>;

/// Factory for authenticated API sessions.
pub trait ApiTransport: Send + Sync {
    /// Session type produced by [`connect`](Self::connect).
    type Session: ApiSession;

    /// Whether the API client capability exists in this environment.
    /// When false, the dispatcher fails the fetch with `E1020` before
    /// attempting any network action.
    fn available(&self) -> bool {
        true
    }

    /// Establish an authenticated session to the device.
    ///
    /// Fails with `E1021` on credential rejection, or a connect error on
    /// network failure.
    fn connect(
        &self,
        device: &Device,
    ) -> impl Future<Output = std::result::Result<Self::Session, ApiError>> + Send;
}

/// One authenticated API session.
///
/// Sessions are consumed by [`disconnect`](Self::disconnect), so every
/// exit path releases the device-side login exactly once.
pub trait ApiSession: Send {
    /// Fetch one configuration endpoint.
    ///
    /// Fails with `E1022` carrying the endpoint name and underlying
    /// cause. A failure on any endpoint aborts the whole fetch; there is
    /// no partial-endpoint success.
    fn fetch_endpoint(
        &mut self,
        endpoint: &str,
    ) -> impl Future<Output = std::result::Result<Value, ApiError>> + Send;

    /// Release the session. Errors during logout are logged, not raised.
    fn disconnect(self) -> impl Future<Output = ()> + Send;
}
