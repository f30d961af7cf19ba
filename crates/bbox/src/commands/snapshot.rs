//! `bbox snapshot`: one refresh cycle, printed whole or by dotted path.

use std::fmt::Write;

use serde_json::Value;

use bbox_core::{CoordinatorConfig, Snapshot};

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::error::CliError;
use crate::output;

fn detail(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cycle:     {}", snapshot.cycle());
    let _ = writeln!(
        out,
        "Fetched:   {}",
        snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    for (name, domain) in snapshot.domains() {
        let keys = domain.as_object().map_or(0, serde_json::Map::len);
        if keys == 0 {
            let _ = writeln!(out, "{name:<16} (unavailable)");
        } else {
            let _ = writeln!(out, "{name:<16} {keys} key(s)");
        }
    }
    out.trim_end().to_owned()
}

fn value_detail(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        scalar => output::plain_value(scalar),
    }
}

pub async fn handle(
    config: CoordinatorConfig,
    args: SnapshotArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = super::fetch_snapshot(config).await?;

    let out = match args.path {
        Some(path) => {
            let value = snapshot.get(&path).ok_or_else(|| CliError::NotFound {
                resource_type: "path".into(),
                identifier: path.clone(),
                list_command: "snapshot -o json".into(),
            })?;
            output::render_single(global.output, value, value_detail, output::plain_value)?
        }
        None => output::render_single(global.output, snapshot.as_ref(), detail, |s| {
            s.domains().keys().cloned().collect::<Vec<_>>().join("\n")
        })?,
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
