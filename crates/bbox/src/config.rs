//! CLI configuration: thin wrapper around `bbox_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (`--host`,
//! `--password`, `--no-tls`, ...).

use std::time::Duration;

use secrecy::SecretString;

use bbox_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use bbox_config::{Config, Profile, config_path, load_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up the active profile, listing the known ones when it is missing.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    config.profile(Some(&name)).map_err(|_| {
        let mut available: Vec<_> = config.profiles.keys().cloned().collect();
        available.sort();
        CliError::ProfileNotFound {
            name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
            path: config_path().display().to_string(),
        }
    })
}

/// Build a `CoordinatorConfig` from the config file, profile, and CLI
/// overrides. Flags take priority over profile values.
pub fn coordinator_config(global: &GlobalOpts) -> Result<CoordinatorConfig, CliError> {
    let cfg = load_config()?;
    let (name, mut profile) = active_profile(global, &cfg)?;

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if global.no_tls {
        profile.use_tls = Some(false);
    }
    if global.insecure {
        profile.verify_ssl = Some(false);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => bbox_config::resolve_password(&profile, &name)?,
    };

    let config = bbox_config::build_coordinator_config(&profile, &cfg.defaults, password)?;
    tracing::debug!(profile = %name, host = %config.host, "resolved router config");
    Ok(config)
}

/// `config` with the refresh interval replaced, rejecting zero.
pub fn with_interval(
    mut config: CoordinatorConfig,
    seconds: Option<u64>,
) -> Result<CoordinatorConfig, CliError> {
    if let Some(seconds) = seconds {
        if seconds < 1 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.refresh_interval = Duration::from_secs(seconds);
    }
    Ok(config)
}
