// ── Runtime connection configuration ──
//
// Describes how to reach one router and how often to poll it. Carries
// credential data but never touches disk: the CLI (or any other host)
// builds a `CoordinatorConfig` and hands it in. An update replaces the
// whole value.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use bbox_api::transport::{TlsMode, TransportConfig};
use bbox_api::BboxClient;

use crate::error::CoreError;

pub const DEFAULT_HOST: &str = "mabbox.bytel.fr";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Configuration for one router connection.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Host name or address, optionally with a port (`192.168.1.254:8443`).
    pub host: String,
    /// Administration password.
    pub password: SecretString,
    /// Talk HTTPS instead of HTTP.
    pub use_tls: bool,
    /// Verify the router's certificate. The factory certificate is
    /// self-signed, so LAN setups usually turn this off.
    pub verify_ssl: bool,
    /// Time between two scheduled refresh cycles.
    pub refresh_interval: Duration,
    /// Per-request timeout, enforced by the transport.
    pub timeout: Duration,
    /// Wait after a toggle command before refreshing, so the router has
    /// applied the change.
    pub settle_delay: Duration,
}

impl CoordinatorConfig {
    /// A config for `host` with every other field at its default.
    pub fn new(host: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            password,
            use_tls: true,
            verify_ssl: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Router base URL derived from `host` and `use_tls`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        BboxClient::url_for_host(&self.host, self.use_tls).map_err(CoreError::from)
    }

    /// Transport parameters for a fresh HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: if self.verify_ssl {
                TlsMode::System
            } else {
                TlsMode::DangerAcceptInvalid
            },
            timeout: self.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar()
    }

    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config {
                message: "host must not be empty".into(),
            });
        }
        if self.refresh_interval < Duration::from_secs(1) {
            return Err(CoreError::Config {
                message: "refresh interval must be at least one second".into(),
            });
        }
        Ok(())
    }
}
