//! HTTPS-backed management API client.
//!
//! Wraps `reqwest::Client` with device URL construction, session login
//! and logout, and per-endpoint configuration reads. Endpoint responses
//! are returned as raw JSON values; the dispatcher serializes the
//! assembled map.

use std::time::Duration;

use log::{debug, warn};
use secrecy::ExposeSecret;
use serde_json::Value;
use url::Url;

use super::tls::CompatTlsProfile;
use super::{ApiSession, ApiTransport};
use crate::device::Device;
use crate::error::ApiError;

/// Default management API port.
const DEFAULT_API_PORT: u16 = 443;

/// Factory for authenticated HTTPS sessions to NetScaler appliances.
#[derive(Debug, Clone)]
pub struct HttpsApiTransport {
    profile: CompatTlsProfile,
    port: u16,
    timeout: Duration,
    base_override: Option<Url>,
    available: bool,
}

impl HttpsApiTransport {
    /// Transport with the NetScaler compatibility profile.
    pub fn netscaler() -> Self {
        Self {
            profile: CompatTlsProfile::netscaler(),
            port: DEFAULT_API_PORT,
            timeout: Duration::from_secs(30),
            base_override: None,
            available: true,
        }
    }

    /// A transport whose API capability is absent. Connecting through it
    /// always fails with `E1020`; used where the client stack cannot be
    /// provisioned.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::netscaler()
        }
    }

    /// Override the management port (default: 443).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the request timeout (default: 30s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the device base URL entirely. Used by tests to point the
    /// transport at a mock server.
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_override = Some(base);
        self
    }

    fn base_url(&self, device: &Device) -> std::result::Result<Url, ApiError> {
        match &self.base_override {
            Some(base) => Ok(base.clone()),
            None => {
                let raw = format!("https://{}:{}/", device.hostname, self.port);
                Ok(Url::parse(&raw)?)
            }
        }
    }
}

impl ApiTransport for HttpsApiTransport {
    type Session = HttpsApiSession;

    fn available(&self) -> bool {
        self.available
    }

    async fn connect(&self, device: &Device) -> std::result::Result<HttpsApiSession, ApiError> {
        let base = self.base_url(device)?;
        let http = self.profile.build_client(self.timeout)?;

        let login_url = base.join("login")?;
        debug!("API login to {} as {}", device.hostname, device.username);
        let response = http
            .post(login_url)
            .json(&serde_json::json!({
                "username": device.username,
                "password": device.password.expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| ApiError::Connect {
                host: device.hostname.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Authentication {
                host: device.hostname.clone(),
                reason: format!("login rejected with HTTP {}", response.status()),
            });
        }

        Ok(HttpsApiSession {
            http,
            base,
            host: device.hostname.clone(),
        })
    }
}

/// One authenticated HTTPS session.
#[derive(Debug)]
pub struct HttpsApiSession {
    http: reqwest::Client,
    base: Url,
    host: String,
}

impl ApiSession for HttpsApiSession {
    async fn fetch_endpoint(&mut self, endpoint: &str) -> std::result::Result<Value, ApiError> {
        let path = format!("config{endpoint}");
        let url = self.base.join(&path)?;

        debug!("fetching {} from {}", endpoint, self.host);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Endpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Endpoint {
                endpoint: endpoint.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        response.json::<Value>().await.map_err(|e| ApiError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: format!("invalid JSON body: {e}"),
        })
    }

    async fn disconnect(self) {
        let logout = match self.base.join("logout") {
            Ok(url) => url,
            Err(_) => return,
        };
        if let Err(e) = self.http.post(logout).send().await {
            warn!("API logout from {} failed: {e}", self.host);
        }
    }
}
