//! `bbox diagnostics`: redacted support dump.

use bbox_core::{Coordinator, CoordinatorConfig};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let report = Coordinator::oneshot(config, |c| async move { c.diagnostics().await }).await?;

    // The report is nested JSON; table view prints it pretty.
    let format = match global.output {
        OutputFormat::Table => OutputFormat::Json,
        other => other,
    };
    let out = output::render_single(format, &report, ToString::to_string, |r| r.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
