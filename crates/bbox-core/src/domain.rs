// ── Data domains ──
//
// The ordered table of remote calls issued on every refresh cycle.
// Each record names the snapshot slot it fills, the endpoint it reads,
// whether a failure aborts the cycle, and whether the response may
// arrive in several fragments that need merging.

use bbox_api::Endpoint;

/// One named category of remote data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainSpec {
    /// Snapshot key (`info`, `devices`, ...).
    pub name: &'static str,
    pub endpoint: Endpoint,
    /// A failure of this call fails the whole cycle.
    pub critical: bool,
    /// The response is a list of fragments to deep-merge rather than a
    /// single record to unwrap.
    pub merge: bool,
}

impl DomainSpec {
    pub const fn required(name: &'static str, endpoint: Endpoint) -> Self {
        Self {
            name,
            endpoint,
            critical: true,
            merge: false,
        }
    }

    pub const fn optional(name: &'static str, endpoint: Endpoint) -> Self {
        Self {
            name,
            endpoint,
            critical: false,
            merge: false,
        }
    }

    pub const fn merged(self) -> Self {
        Self {
            merge: true,
            ..self
        }
    }
}

/// Domains polled by default, in call order.
pub const DEFAULT_DOMAINS: &[DomainSpec] = &[
    DomainSpec::required("info", Endpoint::BboxInfo),
    DomainSpec::required("devices", Endpoint::ConnectedDevices).merged(),
    DomainSpec::required("wan_ip_stats", Endpoint::WanIpStats),
    DomainSpec::optional("wan_ip", Endpoint::WanIp),
    DomainSpec::optional("memory", Endpoint::Memory),
    DomainSpec::optional("wifi", Endpoint::Wireless),
    DomainSpec::optional("wps", Endpoint::Wps),
    DomainSpec::optional("parentalcontrol", Endpoint::ParentalControl),
    DomainSpec::optional("leds", Endpoint::Leds),
    DomainSpec::optional("speedtest_infos", Endpoint::Speedtest),
];

/// Look up a default domain by snapshot key.
pub fn find(name: &str) -> Option<&'static DomainSpec> {
    DEFAULT_DOMAINS.iter().find(|spec| spec.name == name)
}
