//! `bbox watch`: run the periodic refresh loop and print each outcome.

use serde_json::json;

use bbox_core::{Coordinator, CoordinatorConfig, RefreshStatus};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

fn status_line(status: &RefreshStatus, format: OutputFormat, color: bool) -> String {
    let snapshot = status.snapshot.as_deref();
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => json!({
            "cycle": status.cycle,
            "ok": status.is_ok(),
            "snapshot_cycle": snapshot.map(bbox_core::Snapshot::cycle),
            "fetched_at": snapshot.map(|s| s.fetched_at().to_rfc3339()),
            "devices": snapshot.map(|s| s.devices().len()),
            "error": status.last_failure.as_ref().map(ToString::to_string),
        })
        .to_string(),
        OutputFormat::Table | OutputFormat::Plain => {
            let now = chrono::Local::now().format("%H:%M:%S");
            let label = output::outcome_label(status.is_ok(), color);
            match (&status.last_failure, snapshot) {
                (Some(e), _) => format!("{now}  cycle {:<5} {label}  {e}", status.cycle),
                (None, Some(s)) => {
                    let devices = s.devices();
                    let home = devices.iter().filter(|d| d.connected).count();
                    format!(
                        "{now}  cycle {:<5} {label}  devices {home}/{}",
                        status.cycle,
                        devices.len()
                    )
                }
                (None, None) => format!("{now}  cycle {:<5} {label}", status.cycle),
            }
        }
    }
}

pub async fn handle(
    config: CoordinatorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = config::with_interval(config, args.interval)?;
    let coordinator = Coordinator::new(config);
    coordinator.connect().await?;

    let color = output::should_color(global.color);
    let mut stream = coordinator.subscribe();
    output::print_output(
        &status_line(stream.current(), global.output, color),
        global.quiet,
    );

    let mut printed = 1;
    loop {
        if args.count.is_some_and(|n| printed >= n) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            status = stream.changed() => {
                let Some(status) = status else { break };
                output::print_output(&status_line(&status, global.output, color), global.quiet);
                printed += 1;
            }
        }
    }

    coordinator.disconnect().await;
    Ok(())
}
