//! `bbox devices`: hosts from the merged device list.

use tabled::Tabled;

use bbox_core::{CoordinatorConfig, DeviceRecord};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Parental")]
    parental: String,
}

impl DeviceRow {
    fn new(d: &DeviceRecord, color: bool) -> Self {
        Self {
            mac: d.mac.clone(),
            name: d.name.clone(),
            ip: d.ip.clone().unwrap_or_default(),
            link: d.link.clone().unwrap_or_default(),
            state: if d.connected {
                "home".into()
            } else {
                "away".into()
            },
            parental: output::state_label(d.parental_control, color),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = super::fetch_snapshot(config).await?;
    let devices = snapshot.devices();
    let color = output::should_color(global.color);

    let out = output::render_list(
        global.output,
        &devices,
        |d| DeviceRow::new(d, color),
        |d| d.mac.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
