// LAN host records, rebuilt from the merged `devices` domain on every
// snapshot.

use serde::Serialize;
use serde_json::Value;

/// One host known to the router, keyed by MAC address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    pub mac: String,
    pub ip: Option<String>,
    /// User-friendly name, else hostname, else MAC.
    pub name: String,
    pub hostname: Option<String>,
    /// `active == 1`.
    pub connected: bool,
    /// Link type, e.g. `Ethernet` or `Wifi 5`.
    pub link: Option<String>,
    /// Seconds since the router last saw the host.
    pub last_seen: Option<i64>,
    /// Per-host parental control flag.
    pub parental_control: bool,
}

impl DeviceRecord {
    /// Build a record from one `hosts.list` entry. Entries without a
    /// MAC address are not tracked.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mac = non_empty(value, "macaddress")?;
        let hostname = non_empty(value, "hostname");
        let name = non_empty(value, "userfriendlyname")
            .or_else(|| hostname.clone())
            .unwrap_or_else(|| mac.clone());

        Some(Self {
            ip: non_empty(value, "ipaddress"),
            name,
            hostname,
            connected: value.get("active").and_then(Value::as_i64) == Some(1),
            link: non_empty(value, "link"),
            last_seen: value.get("lastseen").and_then(Value::as_i64),
            parental_control: value
                .get("parentalcontrol")
                .and_then(|pc| pc.get("enable"))
                .is_some_and(truthy),
            mac,
        })
    }

    /// Stable key for this host on router `box_id`:
    /// `{box_id}_{mac with ':' replaced by '_'}`.
    pub fn unique_key(&self, box_id: &str) -> String {
        format!("{box_id}_{}", self.mac.replace(':', "_"))
    }
}

fn non_empty(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// The router encodes flags as `0`/`1`, occasionally as booleans.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > f64::EPSILON),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}
