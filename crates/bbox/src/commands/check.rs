//! `bbox check`: confirm the router accepts the configured password.

use serde_json::json;

use bbox_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let serial = bbox_core::validate(&config).await?;
    let color = output::should_color(global.color);

    let report = json!({"host": config.host, "serial": serial, "ok": true});
    let out = output::render_single(
        global.output,
        &report,
        |_| {
            format!(
                "{} credentials accepted by {} (serial {serial})",
                output::outcome_label(true, color),
                config.host
            )
        },
        |_| serial.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
