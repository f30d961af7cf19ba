// ── Entity descriptions ──
//
// Static tables describing the values a host platform exposes from a
// snapshot: sensors, binary sensors, and switches, plus the router's own
// identity. Nothing here holds state; every read goes through the
// snapshot handed in.

use bbox_api::WifiBand;
use serde::Serialize;
use serde_json::Value;

use crate::command::Command;
use crate::device::truthy;
use crate::snapshot::Snapshot;

// ── Sensors ──────────────────────────────────────────────────────

/// How a sensor's raw value becomes its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// The value at `key`, untouched.
    Raw,
    /// The value at `key` as a float.
    Float,
    /// The value at `key` divided by 1000, rounded to two decimals.
    Kilo,
    /// `numerator * 100 / denominator`, both read by dotted path.
    Ratio {
        numerator: &'static str,
        denominator: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    /// Dotted path into the snapshot; also the sensor's key.
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub transform: Transform,
}

impl SensorDescription {
    const fn new(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            unit: None,
            transform: Transform::Raw,
        }
    }

    const fn unit(self, unit: &'static str) -> Self {
        Self {
            unit: Some(unit),
            ..self
        }
    }

    const fn transform(self, transform: Transform) -> Self {
        Self { transform, ..self }
    }

    /// Current state, or `None` when the source data is absent or not
    /// numeric where a number is needed.
    pub fn value(&self, snapshot: &Snapshot) -> Option<Value> {
        match self.transform {
            Transform::Raw => snapshot.get(self.key).cloned(),
            Transform::Float => snapshot.get(self.key).and_then(number).map(Value::from),
            Transform::Kilo => snapshot
                .get(self.key)
                .and_then(number)
                .map(|n| Value::from(round2(n / 1000.0))),
            Transform::Ratio {
                numerator,
                denominator,
            } => {
                let num = snapshot.get(numerator).and_then(number)?;
                let den = snapshot.get(denominator).and_then(number)?;
                (den.abs() > f64::EPSILON).then(|| Value::from(num * 100.0 / den))
            }
        }
    }
}

pub const SENSORS: &[SensorDescription] = &[
    SensorDescription::new("info.device.temperature.current", "System Temperature").unit("°C"),
    SensorDescription::new("wan_ip_stats.wan.ip.stats.rx.bytes", "Downloaded")
        .unit("kbit")
        .transform(Transform::Kilo),
    SensorDescription::new(
        "wan_ip_stats.wan.ip.stats.rx.packetsdiscards",
        "Download discard packet",
    ),
    SensorDescription::new(
        "wan_ip_stats.wan.ip.stats.rx.packetserrors",
        "Download error packet",
    ),
    SensorDescription::new("wan_ip_stats.wan.ip.stats.rx.bandwidth", "Download speed")
        .unit("kbit/s")
        .transform(Transform::Float),
    SensorDescription::new(
        "wan_ip_stats.wan.ip.stats.rx.occupation",
        "Download bandwidth occupation",
    )
    .unit("%")
    .transform(Transform::Ratio {
        numerator: "wan_ip_stats.wan.ip.stats.rx.bandwidth",
        denominator: "wan_ip_stats.wan.ip.stats.rx.maxBandwidth",
    }),
    SensorDescription::new("wan_ip_stats.wan.ip.stats.tx.bytes", "Uploaded")
        .unit("kbit")
        .transform(Transform::Kilo),
    SensorDescription::new(
        "wan_ip_stats.wan.ip.stats.tx.packetsdiscards",
        "Upload discard packet",
    ),
    SensorDescription::new(
        "wan_ip_stats.wan.ip.stats.tx.packetserrors",
        "Upload error packet",
    ),
    SensorDescription::new("wan_ip_stats.wan.ip.stats.tx.bandwidth", "Upload speed")
        .unit("kbit/s")
        .transform(Transform::Float),
    SensorDescription::new(
        "wan_ip_stats.wan.ip.stats.tx.occupation",
        "Upload bandwidth occupation",
    )
    .unit("%")
    .transform(Transform::Ratio {
        numerator: "wan_ip_stats.wan.ip.stats.tx.bandwidth",
        denominator: "wan_ip_stats.wan.ip.stats.tx.maxBandwidth",
    }),
    SensorDescription::new("wan_ip.wan.ip.address", "IP Address"),
    SensorDescription::new("wan_ip.wan.ip.ip6address.0.ipaddress", "IPv6 Address"),
    SensorDescription::new("info.device.numberofboots", "Boot counter"),
    SensorDescription::new("info.device.uptime", "Uptime").unit("s"),
    SensorDescription::new("memory.device.mem.free", "Memory free")
        .unit("%")
        .transform(Transform::Ratio {
            numerator: "memory.device.mem.free",
            denominator: "memory.device.mem.total",
        }),
    SensorDescription::new(
        "speedtest_infos.speedtest.latestmeasurements.download.0.speed",
        "Speedtest download",
    )
    .unit("kbit/s")
    .transform(Transform::Float),
];

// ── Binary sensors ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    /// The sensor is on when the value at `key` equals this.
    pub on_value: i64,
}

impl BinarySensorDescription {
    pub fn is_on(&self, snapshot: &Snapshot) -> Option<bool> {
        snapshot
            .get(self.key)
            .and_then(Value::as_i64)
            .map(|v| v == self.on_value)
    }
}

pub const BINARY_SENSORS: &[BinarySensorDescription] = &[BinarySensorDescription {
    key: "info.device.status",
    name: "Link status",
    on_value: 1,
}];

// ── Switches ─────────────────────────────────────────────────────

/// What a switch toggles on the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchTarget {
    ParentalControl,
    Wps,
    Wireless(WifiBand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchDescription {
    pub key: &'static str,
    pub name: &'static str,
    /// Dotted path holding the current state.
    pub state: &'static str,
    pub target: SwitchTarget,
}

impl SwitchDescription {
    pub fn is_on(&self, snapshot: &Snapshot) -> bool {
        snapshot.get(self.state).is_some_and(truthy)
    }

    /// The command that sets this switch to `enable`.
    pub fn command(&self, enable: bool) -> Command {
        match self.target {
            SwitchTarget::ParentalControl => Command::SetParentalControl { enable },
            SwitchTarget::Wps => Command::SetWps { enable },
            SwitchTarget::Wireless(band) => Command::SetWireless { band, enable },
        }
    }
}

pub const SWITCHES: &[SwitchDescription] = &[
    SwitchDescription {
        key: "parental_control",
        name: "Parental control",
        state: "parentalcontrol.parentalcontrol.scheduler.enable",
        target: SwitchTarget::ParentalControl,
    },
    SwitchDescription {
        key: "wps",
        name: "Wps",
        state: "wps.wps.enable",
        target: SwitchTarget::Wps,
    },
    SwitchDescription {
        key: "wifi_24",
        name: "Wifi 2.4Ghz",
        state: "wifi.wireless.radio.24.enable",
        target: SwitchTarget::Wireless(WifiBand::Band24),
    },
    SwitchDescription {
        key: "wifi_5",
        name: "Wifi 5Ghz",
        state: "wifi.wireless.radio.5.enable",
        target: SwitchTarget::Wireless(WifiBand::Band5),
    },
    SwitchDescription {
        key: "wifi_guest",
        name: "Wifi Guest",
        state: "wifi.wireless.radio.guest.enable",
        target: SwitchTarget::Wireless(WifiBand::Guest),
    },
];

/// Look up a switch by key.
pub fn switch(key: &str) -> Option<&'static SwitchDescription> {
    SWITCHES.iter().find(|s| s.key == key)
}

// ── Router identity ──────────────────────────────────────────────

/// Serial number used when the router does not report one.
pub const DEFAULT_SERIAL: &str = "ABC12345";

/// Identity of the router itself, read from `info.device`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxIdentity {
    pub serial: String,
    pub model: Option<String>,
    pub firmware: Option<String>,
}

impl BoxIdentity {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let text = |path: &str| snapshot.get(path).and_then(Value::as_str).map(str::to_owned);
        Self {
            serial: text("info.device.serialnumber").unwrap_or_else(|| DEFAULT_SERIAL.to_owned()),
            model: text("info.device.modelname"),
            firmware: text("info.device.main.version"),
        }
    }

    /// Unique id of one entity of this router: `{serial}-{key}`.
    pub fn entity_id(&self, key: &str) -> String {
        format!("{}-{key}", self.serial)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Numbers, and strings holding numbers, as `f64`.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
