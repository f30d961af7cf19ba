// Credential check used before a configuration is accepted.

use serde_json::Value;
use tracing::debug;

use bbox_api::Endpoint;

use crate::api::{BboxConnector, Connector};
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::normalize::normalize;

/// Log in with `config`, read the router info, and return its serial
/// number.
pub async fn validate(config: &CoordinatorConfig) -> Result<String, CoreError> {
    validate_with(&BboxConnector, config).await
}

/// [`validate`] through a custom connector.
pub async fn validate_with(
    connector: &dyn Connector,
    config: &CoordinatorConfig,
) -> Result<String, CoreError> {
    config.validate()?;
    let api = connector.connect(config).await?;
    let raw = api.fetch(Endpoint::BboxInfo).await;
    api.close().await;

    let info = normalize("info", raw?)?;
    let serial = info
        .get("device")
        .and_then(|device| device.get("serialnumber"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::ConnectionFailed {
            url: config.host.clone(),
            reason: "router did not report a serial number".into(),
        })?;

    debug!(serial, "credentials accepted");
    Ok(serial.to_owned())
}
