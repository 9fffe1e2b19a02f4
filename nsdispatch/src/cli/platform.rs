//! NetScaler CLI platform profile.
//!
//! One profile per device family, supplied at session construction. This
//! replaces runtime platform switching: a session built with the
//! NetScaler profile speaks NetScaler syntax for its whole lifetime.

/// Platform identifier for Citrix NetScaler appliances.
pub const NETSCALER_PLATFORM: &str = "netscaler";

/// Full-config export command. Output ends without a deterministic
/// prompt, so it must be read in timing mode.
pub const NETSCALER_CONFIG_COMMAND: &str = "export terse verbose hide-sensitive";

/// Default delay factor for timing-mode reads of the export command.
pub const DEFAULT_DELAY_FACTOR: u32 = 10;

/// Markers whose presence in device output indicates a content-level
/// command failure. Matched case-insensitively as substrings.
const FAILURE_MARKERS: [&str; 3] = ["bad", "failed", "failure"];

/// CLI platform profile: command syntax, prompt shape, and failure
/// detection for one device family.
#[derive(Debug, Clone)]
pub struct CliProfile {
    /// Platform name (e.g. "netscaler").
    pub platform: String,

    /// Command that exports the full running configuration.
    pub config_command: String,

    /// Regex matching the interactive prompt at the end of output.
    pub prompt_pattern: String,

    /// Delay factor applied to timing-mode reads.
    pub delay_factor: u32,

    /// Case-insensitive substrings that mark a failed command.
    pub failure_markers: Vec<String>,
}

impl CliProfile {
    /// The Citrix NetScaler profile.
    pub fn netscaler() -> Self {
        Self {
            platform: NETSCALER_PLATFORM.to_string(),
            config_command: NETSCALER_CONFIG_COMMAND.to_string(),
            // "hostname> " or a bare "> " on vanilla appliances
            prompt_pattern: r"(?m)^[\w\-.]{0,63}>\s?$".to_string(),
            delay_factor: DEFAULT_DELAY_FACTOR,
            failure_markers: FAILURE_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Override the delay factor.
    pub fn with_delay_factor(mut self, delay_factor: u32) -> Self {
        self.delay_factor = delay_factor;
        self
    }

    /// Check device output for a failure marker.
    ///
    /// Substring scanning over free text is fragile; this is the single
    /// place it happens, so it can be swapped for a structured status
    /// check if the device family ever exposes one.
    pub fn contains_failure_marker(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.failure_markers.iter().any(|m| lowered.contains(m.as_str()))
    }
}
