// ── Snapshot ──
//
// The complete result of one successful refresh cycle. Built once,
// published behind an `Arc`, never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::device::DeviceRecord;

/// Normalized data of every domain from one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    cycle: u64,
    fetched_at: DateTime<Utc>,
    domains: Map<String, Value>,
}

impl Snapshot {
    pub fn new(cycle: u64, fetched_at: DateTime<Utc>, domains: Map<String, Value>) -> Self {
        Self {
            cycle,
            fetched_at,
            domains,
        }
    }

    /// Number of the refresh cycle that produced this snapshot.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Every domain, keyed by name.
    pub fn domains(&self) -> &Map<String, Value> {
        &self.domains
    }

    /// One domain's object. Optional domains that failed are present
    /// but empty.
    pub fn domain(&self, name: &str) -> Option<&Map<String, Value>> {
        self.domains.get(name).and_then(Value::as_object)
    }

    /// Read a value by dotted path, e.g. `wan_ip_stats.wan.ip.stats.rx.bytes`.
    ///
    /// Objects are walked by key and arrays by numeric index
    /// (`wan_ip.wan.ip.ip6address.0.ipaddress`). Any missing segment
    /// yields `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.domains, path)
    }

    /// Devices listed under `devices.hosts.list`, skipping entries
    /// without a MAC address.
    pub fn devices(&self) -> Vec<DeviceRecord> {
        self.get("devices.hosts.list")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(DeviceRecord::from_value).collect())
            .unwrap_or_default()
    }

    /// Find one device by MAC address (case-insensitive).
    pub fn device(&self, mac: &str) -> Option<DeviceRecord> {
        self.devices()
            .into_iter()
            .find(|device| device.mac.eq_ignore_ascii_case(mac))
    }

    /// The domains as a single JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.domains.clone())
    }
}

/// Walk `root` along a dotted path.
pub fn lookup<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
