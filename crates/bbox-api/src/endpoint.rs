// Read endpoints of the router's management API.

use strum::{Display, EnumIter, IntoStaticStr};

/// A remote data call. Every read endpoint answers with a JSON list of
/// object fragments; the caller decides how to collapse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    /// Router identity, firmware, uptime, temperature.
    BboxInfo,
    /// Hosts currently known to the LAN.
    ConnectedDevices,
    /// WAN counters and bandwidth.
    WanIpStats,
    /// WAN addressing.
    WanIp,
    /// Memory usage.
    Memory,
    /// Front panel LED state.
    Leds,
    /// Radio configuration for every band.
    Wireless,
    /// WPS pairing state.
    Wps,
    /// Parental control scheduler.
    ParentalControl,
    /// Latest speed test measurements.
    Speedtest,
    /// LAN port counters.
    LanStats,
    /// Router summary used during setup.
    DeviceSummary,
}

impl Endpoint {
    /// Path relative to `{base}/api/v1/`.
    pub fn path(self) -> &'static str {
        match self {
            Self::BboxInfo => "device",
            Self::ConnectedDevices => "hosts",
            Self::WanIpStats => "wan/ip/stats",
            Self::WanIp => "wan/ip",
            Self::Memory => "device/mem",
            Self::Leds => "device/led",
            Self::Wireless => "wireless",
            Self::Wps => "wps",
            Self::ParentalControl => "parentalcontrol",
            Self::Speedtest => "speedtest",
            Self::LanStats => "lan/stats",
            Self::DeviceSummary => "device/summary",
        }
    }
}
