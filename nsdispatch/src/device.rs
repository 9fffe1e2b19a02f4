//! Device inventory input.
//!
//! The inventory system owns devices; the dispatcher treats them as
//! read-only input. Only the fields the two transports need are modeled
//! here.

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

/// Custom field holding an optional secondary CLI command block,
/// pushed as an extra leg during a config merge.
pub const CLI_CONFIGURATION_FIELD: &str = "cli_configuration";

/// A remote network appliance as supplied by the inventory system.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    /// Display name used in logs and outcome messages.
    pub name: String,

    /// Network address (hostname or IP).
    pub hostname: String,

    /// Username for both transports.
    pub username: String,

    /// Password for both transports.
    pub password: SecretString,

    /// Inventory platform identifier. Informational only: the CLI driver
    /// identity is fixed by the session profile, not by this field.
    #[serde(default)]
    pub platform: String,

    /// Inventory custom fields, keyed by field name.
    #[serde(default)]
    pub custom_fields: IndexMap<String, String>,
}

impl Device {
    /// Create a device with the required connection fields.
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            platform: String::new(),
            custom_fields: IndexMap::new(),
        }
    }

    /// Set a custom field.
    pub fn with_custom_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.insert(key.into(), value.into());
        self
    }

    /// Set the inventory platform identifier.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// The secondary CLI command block to push during a merge, if the
    /// device carries a non-empty `cli_configuration` custom field.
    pub fn cli_configuration(&self) -> Option<&str> {
        self.custom_fields
            .get(CLI_CONFIGURATION_FIELD)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_configuration_absent() {
        let device = Device::new("ns1", "10.0.0.1", "admin", "secret");
        assert!(device.cli_configuration().is_none());
    }

    #[test]
    fn test_cli_configuration_empty_is_none() {
        let device = Device::new("ns1", "10.0.0.1", "admin", "secret")
            .with_custom_field(CLI_CONFIGURATION_FIELD, "");
        assert!(device.cli_configuration().is_none());
    }

    #[test]
    fn test_cli_configuration_present() {
        let device = Device::new("ns1", "10.0.0.1", "admin", "secret")
            .with_custom_field(CLI_CONFIGURATION_FIELD, "set ns hostname NS1");
        assert_eq!(device.cli_configuration(), Some("set ns hostname NS1"));
    }
}
