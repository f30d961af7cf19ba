// ── Router seam ──
//
// The coordinator talks to the router through `RouterApi` and obtains
// one from a `Connector` each time the configuration changes. The
// production pair wraps `BboxClient`; tests substitute in-memory fakes.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};

use bbox_api::{BboxClient, Endpoint};

use crate::command::Command;
use crate::config::CoordinatorConfig;
use crate::error::CoreError;

/// An authenticated connection to one router.
pub trait RouterApi: Send + Sync {
    /// Read one endpoint, returning the raw body.
    fn fetch(&self, endpoint: Endpoint) -> BoxFuture<'_, Result<Value, bbox_api::Error>>;

    /// Run one write command.
    fn execute<'a>(&'a self, command: &'a Command) -> BoxFuture<'a, Result<(), bbox_api::Error>>;

    /// Close the session. Failures are not fatal.
    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

/// Derives a fresh [`RouterApi`] from a configuration.
pub trait Connector: Send + Sync {
    fn connect<'a>(
        &'a self,
        config: &'a CoordinatorConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn RouterApi>, CoreError>>;
}

// ── Production implementation ────────────────────────────────────

/// Connects over HTTP with [`BboxClient`] and logs in with the
/// configured password.
#[derive(Debug, Clone, Copy, Default)]
pub struct BboxConnector;

impl Connector for BboxConnector {
    fn connect<'a>(
        &'a self,
        config: &'a CoordinatorConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn RouterApi>, CoreError>> {
        Box::pin(async move {
            let client = login(config).await?;
            Ok(Arc::new(client) as Arc<dyn RouterApi>)
        })
    }
}

/// Build a client for `config` and open a session.
pub async fn login(config: &CoordinatorConfig) -> Result<BboxClient, CoreError> {
    let base_url = config.base_url()?;
    let client = BboxClient::new(base_url, &config.transport())?;
    client.login(&config.password).await?;
    debug!(host = %config.host, "session established");
    Ok(client)
}

impl RouterApi for BboxClient {
    fn fetch(&self, endpoint: Endpoint) -> BoxFuture<'_, Result<Value, bbox_api::Error>> {
        Box::pin(BboxClient::fetch(self, endpoint))
    }

    fn execute<'a>(&'a self, command: &'a Command) -> BoxFuture<'a, Result<(), bbox_api::Error>> {
        Box::pin(async move {
            match command {
                Command::Reboot => self.reboot().await,
                Command::SetWireless { band, enable } => self.set_wireless(*band, *enable).await,
                Command::SetWps { enable } => self.set_wps(*enable).await,
                Command::SetParentalControl { enable } => {
                    self.set_parental_control(*enable).await
                }
                Command::SetDeviceParentalControl { mac, enable } => {
                    self.set_device_parental_control(mac, *enable).await
                }
            }
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.logout().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        })
    }
}
