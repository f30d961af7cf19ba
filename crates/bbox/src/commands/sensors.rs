//! `bbox sensors`: every entity table evaluated against one snapshot.

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use bbox_core::entity::{BINARY_SENSORS, SENSORS, SWITCHES};
use bbox_core::{BoxIdentity, CoordinatorConfig, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct EntityState {
    entity_id: String,
    kind: &'static str,
    name: &'static str,
    state: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'static str>,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&EntityState> for EntityRow {
    fn from(e: &EntityState) -> Self {
        let mut state = match e.state {
            Value::Null => "unknown".to_owned(),
            ref other => output::plain_value(other),
        };
        if let (Some(unit), false) = (e.unit, e.state.is_null()) {
            state = format!("{state} {unit}");
        }
        Self {
            entity_id: e.entity_id.clone(),
            kind: e.kind,
            name: e.name,
            state,
        }
    }
}

fn entity_states(snapshot: &Snapshot) -> Vec<EntityState> {
    let identity = BoxIdentity::from_snapshot(snapshot);
    let on_off = |on: bool| Value::from(if on { "on" } else { "off" });

    let sensors = SENSORS.iter().map(|s| EntityState {
        entity_id: identity.entity_id(s.key),
        kind: "sensor",
        name: s.name,
        state: s.value(snapshot).unwrap_or(Value::Null),
        unit: s.unit,
    });
    let binary = BINARY_SENSORS.iter().map(|b| EntityState {
        entity_id: identity.entity_id(b.key),
        kind: "binary_sensor",
        name: b.name,
        state: b.is_on(snapshot).map_or(Value::Null, on_off),
        unit: None,
    });
    let switches = SWITCHES.iter().map(|s| EntityState {
        entity_id: identity.entity_id(s.key),
        kind: "switch",
        name: s.name,
        state: on_off(s.is_on(snapshot)),
        unit: None,
    });

    sensors.chain(binary).chain(switches).collect()
}

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = super::fetch_snapshot(config).await?;
    let states = entity_states(&snapshot);

    let out = output::render_list(global.output, &states, |e| EntityRow::from(e), |e| {
        format!("{}={}", e.entity_id, output::plain_value(&e.state))
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
