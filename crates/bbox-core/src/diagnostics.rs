// ── Diagnostics ──
//
// A support dump: configuration, current snapshot, and raw endpoint
// bodies, with identifying fields replaced before anything leaves the
// process.

use serde_json::{Map, Value, json};
use tracing::debug;

use bbox_api::Endpoint;

use crate::api::RouterApi;
use crate::config::CoordinatorConfig;
use crate::domain::DomainSpec;
use crate::snapshot::Snapshot;

pub const REDACTED: &str = "**REDACTED**";

/// Keys whose values never appear in a dump, at any depth.
pub const TO_REDACT: &[&str] = &[
    "username",
    "password",
    "encryption_password",
    "encryption_salt",
    "host",
    "api_key",
    "serial",
    "system_serial",
    "ip4_addr",
    "ip6_addr",
    "account",
    "key",
];

/// Endpoints dumped on top of the polled domains.
const EXTRA_ENDPOINTS: &[Endpoint] = &[Endpoint::LanStats, Endpoint::DeviceSummary];

/// Copy of `value` with every [`TO_REDACT`] key masked.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let inner = if TO_REDACT.contains(&key.as_str()) {
                        Value::String(REDACTED.to_owned())
                    } else {
                        redact(inner)
                    };
                    (key.clone(), inner)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        scalar => scalar.clone(),
    }
}

/// Fetch every endpoint once, in order. A failing endpoint yields `{}`.
pub async fn raw_dump(api: &dyn RouterApi, domains: &[DomainSpec]) -> Map<String, Value> {
    let endpoints = domains
        .iter()
        .map(|spec| spec.endpoint)
        .chain(EXTRA_ENDPOINTS.iter().copied());

    let mut raw = Map::new();
    for endpoint in endpoints {
        let body = match api.fetch(endpoint).await {
            Ok(body) => body,
            Err(e) => {
                debug!(%endpoint, error = %e, "diagnostics fetch failed");
                Value::Object(Map::new())
            }
        };
        raw.insert(endpoint.to_string(), body);
    }
    raw
}

/// Assemble the redacted report.
pub fn report(
    config: &CoordinatorConfig,
    snapshot: Option<&Snapshot>,
    raw: Map<String, Value>,
) -> Value {
    let config = json!({
        "host": config.host,
        "password": REDACTED,
        "use_tls": config.use_tls,
        "verify_ssl": config.verify_ssl,
        "refresh_rate": config.refresh_interval.as_secs(),
        "timeout": config.timeout.as_secs(),
    });
    let data = snapshot.map_or(Value::Null, |s| {
        json!({
            "cycle": s.cycle(),
            "fetched_at": s.fetched_at().to_rfc3339(),
            "domains": redact(&s.to_value()),
        })
    });

    json!({
        "config": redact(&config),
        "data": data,
        "raw": redact(&Value::Object(raw)),
    })
}
