//! Orchestration of the two public operations.
//!
//! `fetch_config` drives the CLI leg then the API leg, producing the
//! `-cli` and API backup artifacts; `merge_config` pushes a merged
//! configuration over the CLI and aggregates per-leg results into one
//! verdict.
//!
//! Per-device dispatchers are independent units of work: there is no
//! cross-device shared state, so an external worker pool may run any
//! number of them concurrently. Within one invocation execution is
//! strictly sequential -- the CLI leg completes before the API leg
//! begins, because both write into the same backup-path namespace and an
//! API failure must not mask a CLI artifact already on disk.

use std::path::Path;

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::api::{ApiSession, ApiTransport, CONFIG_ENDPOINTS, EndpointConfigMap};
use crate::artifact;
use crate::cli::{CliSession, PushResult, TimingMode};
use crate::device::Device;
use crate::error::{ApiError, Error, Result};
use crate::outcome::TaskOutcome;
use crate::transform::{self, TransformRules};

/// Configuration dispatcher for one device invocation.
///
/// Holds the two session adapters; both legs of a fetch are jointly
/// required, so any sub-operation failure is terminal for the whole
/// operation. No retries happen here -- retry policy belongs to the
/// external scheduler.
pub struct Dispatcher<C, A> {
    cli: C,
    api: A,
}

impl<C, A> Dispatcher<C, A>
where
    C: CliSession,
    A: ApiTransport,
{
    /// Create a dispatcher from the two adapters.
    pub fn new(cli: C, api: A) -> Self {
        Self { cli, api }
    }

    /// Retrieve, process, and persist the device configuration over both
    /// transports.
    ///
    /// Writes the CLI-derived artifact to `<backup_path>-cli<ext>` and
    /// the API-derived artifact to `backup_path`, then returns a success
    /// outcome carrying the processed API configuration. Any transport,
    /// dependency, or endpoint failure is immediately terminal; a
    /// delivered-but-failed CLI result is returned as a failed outcome
    /// without attempting the API leg.
    pub async fn fetch_config(
        &mut self,
        device: &Device,
        backup_path: &Path,
        rules: &TransformRules,
    ) -> Result<TaskOutcome> {
        // CLI leg
        let command = self.cli.profile().config_command.clone();
        let delay_factor = self.cli.profile().delay_factor;
        let response = self
            .cli
            .run_command(&command, TimingMode::Timing { delay_factor })
            .await
            .inspect_err(|e| {
                error!("{}: CLI backup failed with an unknown issue. `{e}`", device.name);
            })?;

        if !response.is_success() || response.is_empty() {
            warn!("{}: CLI backup command returned a failed result", device.name);
            return Ok(TaskOutcome::failure(format!(
                "{}: CLI backup command '{}' failed: {}",
                device.name, command, response.result
            )));
        }

        let cli_path = artifact::cli_artifact_path(backup_path);
        debug!("CLI backup file will be: {}", cli_path.display());
        transform::process_config(&response.result, rules, &cli_path)?;

        // API leg
        debug!(
            "executing API fetch for {} on {}",
            device.name,
            self.cli.profile().platform
        );
        if !self.api.available() {
            let err = ApiError::DependencyMissing;
            error!("{}: {err}", device.name);
            return Err(err.into());
        }

        let config_data = fetch_api_config(&self.api, device, &CONFIG_ENDPOINTS).await?;

        let serialized = serialize_endpoint_map(&config_data)?;
        let processed = transform::process_config(&serialized, rules, backup_path)?;

        info!("{}: configuration backed up to {}", device.name, backup_path.display());
        Ok(TaskOutcome::success(format!(
            "{}: configuration fetched over CLI and API",
            device.name
        ))
        .with_config(processed.text))
    }

    /// Push a merged configuration to the device.
    ///
    /// Pushes the full command set, then the device's secondary
    /// `cli_configuration` block if present, and aggregates the legs into
    /// one outcome. Content-level failures (failure markers in device
    /// output) are reported in the outcome, never raised; only transport
    /// failures abort.
    pub async fn merge_config(&mut self, device: &Device, config_text: &str) -> Result<TaskOutcome> {
        info!("{}: config merge starting", device.name);

        let lines: Vec<String> = config_text.lines().map(str::to_string).collect();
        let first = self
            .cli
            .push_config(&lines)
            .await
            .inspect_err(|e| error!("{}: failed with error: `{e}`", device.name))?;

        let mut legs = vec![first];
        if let Some(extra) = device.cli_configuration() {
            let extra_lines: Vec<String> = extra.lines().map(str::to_string).collect();
            let second = self
                .cli
                .push_config(&extra_lines)
                .await
                .inspect_err(|e| error!("{}: failed with error: `{e}`", device.name))?;
            legs.push(second);
        }

        let outcome = aggregate_push_legs(&legs);
        if outcome.failed {
            warn!("{}: config merged with errors, please check full info log below.", device.name);
            for leg in &legs {
                error!("{}: result: {}", device.name, leg.output);
            }
        } else {
            info!("{}: config merged successfully.", device.name);
            for leg in &legs {
                info!("{}: result: {}", device.name, leg.output);
            }
        }
        Ok(outcome)
    }
}

/// OR-aggregate per-leg push results into one outcome.
///
/// `failed` and `changed` are true if any leg failed or changed state;
/// the message is every leg's raw output joined in leg order.
fn aggregate_push_legs(legs: &[PushResult]) -> TaskOutcome {
    let failed = legs.iter().any(|leg| leg.failed);
    let changed = legs.iter().any(|leg| leg.changed);
    let message = legs
        .iter()
        .map(|leg| leg.output.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    TaskOutcome {
        failed,
        changed,
        message,
        config: None,
    }
}

/// Connect, walk the endpoint list in order, and release the session.
///
/// The session is disconnected exactly once on every exit path. An empty
/// walk is a failure: an API artifact without content is not a usable
/// backup, so a walk that yields nothing fails the fetch.
async fn fetch_api_config<A: ApiTransport>(
    api: &A,
    device: &Device,
    endpoints: &[&str],
) -> Result<EndpointConfigMap> {
    let mut session = api.connect(device).await.inspect_err(|e| {
        error!("{}: {e}", device.name);
    })?;

    let mut config_data = EndpointConfigMap::new();
    for endpoint in endpoints {
        match session.fetch_endpoint(endpoint).await {
            Ok(value) => {
                config_data.insert(endpoint.to_string(), value);
            }
            Err(e) => {
                error!("{}: {e}", device.name);
                session.disconnect().await;
                return Err(e.into());
            }
        }
    }
    session.disconnect().await;

    if config_data.is_empty() {
        let err = ApiError::EmptyConfig;
        error!("{}: {err}", device.name);
        return Err(err.into());
    }
    Ok(config_data)
}

/// Serialize the endpoint map to pretty JSON with 4-space indent.
fn serialize_endpoint_map(map: &EndpointConfigMap) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    map.serialize(&mut serializer)
        .map_err(Error::Serialize)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leg(output: &str, changed: bool, failed: bool) -> PushResult {
        PushResult {
            output: output.to_string(),
            changed,
            failed,
        }
    }

    #[test]
    fn test_aggregation_or_over_failed() {
        let outcome = aggregate_push_legs(&[leg("Done", true, false), leg("ERROR: failed", false, true)]);
        assert!(outcome.failed);
        assert!(outcome.changed);
        assert_eq!(outcome.message, "Done\nERROR: failed");
    }

    #[test]
    fn test_aggregation_all_clean() {
        let outcome = aggregate_push_legs(&[leg("Done", true, false), leg("Done", true, false)]);
        assert!(!outcome.failed);
        assert!(outcome.changed);
    }

    #[test]
    fn test_aggregation_single_leg() {
        let outcome = aggregate_push_legs(&[leg("Done", true, false)]);
        assert!(!outcome.failed);
        assert!(outcome.changed);
        assert_eq!(outcome.message, "Done");
    }

    #[test]
    fn test_aggregation_message_preserves_leg_order() {
        let outcome = aggregate_push_legs(&[leg("first leg", false, false), leg("second leg", false, false)]);
        let first = outcome.message.find("first leg").unwrap();
        let second = outcome.message.find("second leg").unwrap();
        assert!(first < second);
    }

    struct StubApi;

    impl ApiTransport for StubApi {
        type Session = StubSession;

        async fn connect(&self, _device: &Device) -> std::result::Result<StubSession, ApiError> {
            Ok(StubSession)
        }
    }

    struct StubSession;

    impl ApiSession for StubSession {
        async fn fetch_endpoint(
            &mut self,
            endpoint: &str,
        ) -> std::result::Result<serde_json::Value, ApiError> {
            Ok(json!([{ "endpoint": endpoint }]))
        }

        async fn disconnect(self) {}
    }

    #[tokio::test]
    async fn test_empty_endpoint_walk_is_a_failure() {
        let device = Device::new("ns1", "192.0.2.10", "nsroot", "secret");

        let config = fetch_api_config(&StubApi, &device, &[]).await;
        assert!(matches!(config, Err(Error::Api(ApiError::EmptyConfig))));
    }

    #[tokio::test]
    async fn test_endpoint_walk_collects_in_list_order() {
        let device = Device::new("ns1", "192.0.2.10", "nsroot", "secret");

        let config = fetch_api_config(&StubApi, &device, &CONFIG_ENDPOINTS)
            .await
            .unwrap();
        let keys: Vec<&str> = config.keys().map(String::as_str).collect();
        assert_eq!(keys, CONFIG_ENDPOINTS);
    }

    #[test]
    fn test_endpoint_map_serialization_keeps_order() {
        let mut map = EndpointConfigMap::new();
        map.insert("/system/identity".to_string(), json!([{"name": "ns1"}]));
        map.insert("/user".to_string(), json!([{"name": "admin"}]));

        let text = serialize_endpoint_map(&map).unwrap();
        let identity = text.find("/system/identity").unwrap();
        let user = text.find("/user").unwrap();
        assert!(identity < user);
        // 4-space indent, matching the artifact format consumers diff against
        assert!(text.contains("\n    \""));
    }
}
