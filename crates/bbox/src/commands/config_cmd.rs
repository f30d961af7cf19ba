//! Config subcommand handlers.

use std::fmt::Write as _;
use std::io::BufRead;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "use_tls = {}", cfg.defaults.use_tls);
    let _ = writeln!(out, "verify_ssl = {}", cfg.defaults.verify_ssl);
    let _ = writeln!(out, "refresh_rate = {}", cfg.defaults.refresh_rate);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "host = \"{}\"", p.host);
        if let Some(use_tls) = p.use_tls {
            let _ = writeln!(out, "use_tls = {use_tls}");
        }
        if let Some(verify_ssl) = p.verify_ssl {
            let _ = writeln!(out, "verify_ssl = {verify_ssl}");
        }
        if let Some(rate) = p.refresh_rate {
            let _ = writeln!(out, "refresh_rate = {rate}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
    }

    out.trim_end().to_owned()
}

fn set_password(profile_name: &str) -> Result<String, CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "expected the password on stdin, got an empty line".into(),
        });
    }
    bbox_config::store_password(profile_name, password)?;
    Ok(format!("Password stored in keyring for profile '{profile_name}'"))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.command {
        ConfigCommand::Path => config::config_path().display().to_string(),
        ConfigCommand::Show => format_config_redacted(&config::load_config()?),
        ConfigCommand::SetPassword => {
            let cfg = config::load_config()?;
            set_password(&config::active_profile_name(global, &cfg))?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    #[test]
    fn show_masks_passwords() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                host: "192.168.1.254".into(),
                password: Some("hunter2".into()),
                password_env: Some("HOME_PW".into()),
                ..Profile::default()
            },
        );
        let shown = format_config_redacted(&cfg);
        assert!(shown.contains("[profiles.home]"));
        assert!(shown.contains("password = \"****\""));
        assert!(shown.contains("password_env = \"HOME_PW\""));
        assert!(!shown.contains("hunter2"));
    }
}
