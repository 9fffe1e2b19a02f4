//! Aggregated verdict returned for one dispatcher invocation.

/// Result of one dispatcher operation.
///
/// `failed` and `changed` are OR-aggregates over every leg of the
/// invocation: a single failed leg fails the whole outcome, and a single
/// leg that changed device state marks the outcome as changed. Partial
/// CLI/API results are never folded into a silent success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// True if any constituent leg failed.
    pub failed: bool,

    /// True if any constituent leg changed device state.
    pub changed: bool,

    /// Human-readable message; for merges this is the combined raw
    /// device output of every leg, in leg order.
    pub message: String,

    /// Processed API configuration payload (fetch only).
    pub config: Option<String>,
}

impl TaskOutcome {
    /// A successful outcome with no state change.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            failed: false,
            changed: false,
            message: message.into(),
            config: None,
        }
    }

    /// A failed outcome with no state change.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            failed: true,
            changed: false,
            message: message.into(),
            config: None,
        }
    }

    /// Attach the processed configuration payload.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Set the changed flag.
    pub fn with_changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }
}
