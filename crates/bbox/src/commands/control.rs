//! Router write commands: reboot and the switch toggles.
//!
//! Toggles go through the coordinator's command processor, which waits
//! for the router to settle and refreshes; the state printed afterwards
//! is read back from that refreshed snapshot.

use serde_json::json;

use bbox_core::entity::{self, SwitchDescription};
use bbox_core::{Command, CommandResult, Coordinator, CoordinatorConfig, CoreError, Snapshot};

use crate::cli::{Band, GlobalOpts, ParentalArgs, ToggleArgs, WifiArgs};
use crate::error::CliError;
use crate::output;

/// Outcome of one toggle, as printed.
#[derive(Debug, serde::Serialize)]
struct ToggleOutcome {
    target: String,
    requested: bool,
    /// State read back after the refresh, if one ran.
    state: Option<bool>,
    cycle: Option<u64>,
}

fn detail(outcome: &ToggleOutcome, color: bool) -> String {
    let requested = output::state_label(outcome.requested, color);
    match outcome.state {
        Some(state) if state == outcome.requested => {
            format!("{} is now {requested}", outcome.target)
        }
        Some(state) => format!(
            "{} requested {requested}, router still reports {}",
            outcome.target,
            output::state_label(state, color)
        ),
        None => format!("{} set to {requested} (not yet confirmed)", outcome.target),
    }
}

/// Run `command` and read the resulting state back with `read`.
async fn toggle(
    config: CoordinatorConfig,
    target: String,
    command: Command,
    enable: bool,
    read: impl FnOnce(&Snapshot) -> Option<bool>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device_mac = match command {
        Command::SetDeviceParentalControl { ref mac, .. } => Some(mac.clone()),
        _ => None,
    };
    let known_mac = device_mac.clone();

    let executed = Coordinator::oneshot(config, |c| async move {
        // Per-host toggles only apply to hosts the router lists.
        if let Some(ref mac) = known_mac {
            if !c.snapshot().is_some_and(|s| s.device(mac).is_some()) {
                return Ok(None);
            }
        }
        let result = c.execute(command).await?;
        Ok::<_, CoreError>(Some((result, c.snapshot())))
    })
    .await?;

    let Some((result, snapshot)) = executed else {
        return Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: device_mac.unwrap_or_default(),
            list_command: "devices".into(),
        });
    };

    let (state, cycle) = match result {
        CommandResult::Refreshed { cycle } => (snapshot.as_deref().and_then(read), Some(cycle)),
        CommandResult::Ok => (None, None),
    };
    let outcome = ToggleOutcome {
        target,
        requested: enable,
        state,
        cycle,
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &outcome,
        |o| detail(o, color),
        |o| o.state.map_or_else(String::new, |s| output::state_label(s, false)),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn toggle_switch(
    config: CoordinatorConfig,
    key: &str,
    enable: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let switch: &'static SwitchDescription = entity::switch(key)
        .ok_or_else(|| CliError::Internal(format!("no switch named '{key}'")))?;
    toggle(
        config,
        switch.name.to_owned(),
        switch.command(enable),
        enable,
        move |s| Some(switch.is_on(s)),
        global,
    )
    .await
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn wifi(
    config: CoordinatorConfig,
    args: WifiArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let key = match args.band {
        Band::Band24 => "wifi_24",
        Band::Band5 => "wifi_5",
        Band::Guest => "wifi_guest",
    };
    toggle_switch(config, key, args.state.enabled(), global).await
}

pub async fn wps(
    config: CoordinatorConfig,
    args: ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    toggle_switch(config, "wps", args.state.enabled(), global).await
}

pub async fn parental(
    config: CoordinatorConfig,
    args: ParentalArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let enable = args.state.enabled();
    match args.mac {
        None => toggle_switch(config, "parental_control", enable, global).await,
        Some(mac) => {
            let target = format!("Parental control for {mac}");
            let command = Command::SetDeviceParentalControl {
                mac: mac.clone(),
                enable,
            };
            toggle(
                config,
                target,
                command,
                enable,
                move |s| s.device(&mac).map(|d| d.parental_control),
                global,
            )
            .await
        }
    }
}

pub async fn reboot(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let host = config.host.clone();
    Coordinator::oneshot(config, |c| async move { c.execute(Command::Reboot).await }).await?;

    let out = output::render_single(
        global.output,
        &json!({"host": &host, "reboot": "requested"}),
        |_| format!("Reboot requested for {host}"),
        |_| host.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
