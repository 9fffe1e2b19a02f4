//! Relaxed TLS profile for the NetScaler management API.
//!
//! The appliance family requires plaintext-style login inside a nominally
//! encrypted channel negotiated with a reduced cipher suite, and ships
//! self-signed certificates. This is a narrowly-scoped compatibility
//! exception for that one family: the profile is only ever constructed by
//! [`HttpsApiTransport::netscaler`](super::HttpsApiTransport::netscaler)
//! and must not become a transport default elsewhere.

use std::time::Duration;

use crate::error::ApiError;

/// Cipher list the appliance's management endpoint negotiates.
pub const NETSCALER_CIPHER_LIST: &str = "ADH-AES256-GCM-SHA384:ADH-AES256-SHA256:@SECLEVEL=0";

/// Device-family-specific TLS compatibility profile.
#[derive(Debug, Clone)]
pub struct CompatTlsProfile {
    /// Skip server-certificate validation.
    pub accept_invalid_certs: bool,

    /// Cipher list the device requires. Applied as far as the TLS
    /// backend allows; rustls cannot negotiate the anonymous DH suites,
    /// so this also documents the device-side contract.
    pub cipher_list: String,

    /// Send credentials as a plain login request inside the channel.
    pub plaintext_login: bool,
}

impl CompatTlsProfile {
    /// The NetScaler profile: validation off, reduced ciphers,
    /// plaintext login.
    pub fn netscaler() -> Self {
        Self {
            accept_invalid_certs: true,
            cipher_list: NETSCALER_CIPHER_LIST.to_string(),
            plaintext_login: true,
        }
    }

    /// Build a `reqwest::Client` honoring this profile.
    pub(crate) fn build_client(
        &self,
        timeout: Duration,
    ) -> std::result::Result<reqwest::Client, ApiError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true);

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| ApiError::Tls(e.to_string()))
    }
}
