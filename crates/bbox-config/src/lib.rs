//! Profile configuration for Bbox tools.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `bbox_core::CoordinatorConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bbox_core::CoordinatorConfig;
use bbox_core::config::{DEFAULT_HOST, DEFAULT_REFRESH_INTERVAL, DEFAULT_TIMEOUT};

/// Keyring service name for stored router passwords.
pub const KEYRING_SERVICE: &str = "bbox";

/// Environment variable consulted after a profile's `password_env`.
pub const PASSWORD_ENV: &str = "BBOX_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Values a profile inherits unless it overrides them.
#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_true")]
    pub use_tls: bool,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u64,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            use_tls: true,
            verify_ssl: true,
            refresh_rate: default_refresh_rate(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_true() -> bool {
    true
}
fn default_refresh_rate() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// A named router profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router host name or address, optionally with a port.
    #[serde(default = "default_host")]
    pub host: String,

    pub use_tls: Option<bool>,

    pub verify_ssl: Option<bool>,

    pub refresh_rate: Option<u64>,

    pub timeout: Option<u64>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            host: default_host(),
            use_tls: None,
            verify_ssl: None,
            refresh_rate: None,
            timeout: None,
            password: None,
            password_env: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    ///
    /// A missing `default` profile resolves to built-in defaults so the
    /// tools work without a config file.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());

        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile.clone())),
            None if name == "default" => Ok((name, Profile::default())),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("fr", "bbox", "bbox").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bbox");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment.
///
/// Nested keys come from `BBOX_`-prefixed variables split on `__`,
/// e.g. `BBOX_DEFAULTS__REFRESH_RATE=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BBOX_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a profile's password from the credential chain.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

/// [`resolve_password`] with injectable environment and keyring lookups.
///
/// Order: the profile's `password_env` variable, `BBOX_PASSWORD`, the
/// keyring entry `bbox / {profile}/password`, then plaintext.
pub fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Some(val) = env(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Some(val) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Some(secret) = keyring(&keyring_user(profile_name)) {
        return Ok(SecretString::from(secret));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `CoordinatorConfig` from a profile, its inherited defaults,
/// and an already-resolved password.
pub fn build_coordinator_config(
    profile: &Profile,
    defaults: &Defaults,
    password: SecretString,
) -> Result<CoordinatorConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let refresh_rate = profile.refresh_rate.unwrap_or(defaults.refresh_rate);
    if refresh_rate < 1 {
        return Err(ConfigError::Validation {
            field: "refresh_rate".into(),
            reason: format!("must be at least 1 second, got {refresh_rate}"),
        });
    }

    let mut config = CoordinatorConfig::new(profile.host.trim(), password);
    config.use_tls = profile.use_tls.unwrap_or(defaults.use_tls);
    config.verify_ssl = profile.verify_ssl.unwrap_or(defaults.verify_ssl);
    config.refresh_interval = Duration::from_secs(refresh_rate);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

/// Build a `CoordinatorConfig` from a profile, resolving its password.
pub fn profile_to_coordinator_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<CoordinatorConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    build_coordinator_config(profile, defaults, password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn resolve(
        profile: &Profile,
        env: impl Fn(&str) -> Option<String>,
        keyring: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        resolve_password_with(profile, "home", env, keyring)
            .ok()
            .map(|s| s.expose_secret().to_owned())
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
refresh_rate = 120

[profiles.home]
host = "192.168.1.254"
verify_ssl = false
password_env = "HOME_BBOX_PW"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.refresh_rate, 120);
        assert_eq!(config.defaults.timeout, 30);

        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(profile.host, "192.168.1.254");
        assert_eq!(profile.verify_ssl, Some(false));
        assert_eq!(profile.password_env.as_deref(), Some("HOME_BBOX_PW"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.host, DEFAULT_HOST);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        let err = config.profile(Some("office")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { name } if name == "office"));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                host: "10.0.0.1".into(),
                refresh_rate: Some(15),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.profile(None).unwrap();
        assert_eq!(profile.host, "10.0.0.1");
        assert_eq!(profile.refresh_rate, Some(15));
    }

    #[test]
    fn password_env_wins_over_everything() {
        let profile = Profile {
            password: Some("plain".into()),
            password_env: Some("MY_PW".into()),
            ..Profile::default()
        };
        let env = |name: &str| match name {
            "MY_PW" => Some("from-profile-env".to_owned()),
            PASSWORD_ENV => Some("from-global-env".to_owned()),
            _ => None,
        };
        assert_eq!(
            resolve(&profile, env, |_| Some("stored".into())).as_deref(),
            Some("from-profile-env")
        );
    }

    #[test]
    fn global_env_then_keyring_then_plaintext() {
        let profile = Profile {
            password: Some("plain".into()),
            password_env: Some("UNSET".into()),
            ..Profile::default()
        };
        let global = |name: &str| (name == PASSWORD_ENV).then(|| "global".to_owned());
        assert_eq!(resolve(&profile, global, |_| None).as_deref(), Some("global"));

        let keyring = |user: &str| (user == "home/password").then(|| "stored".to_owned());
        assert_eq!(resolve(&profile, no_env, keyring).as_deref(), Some("stored"));

        assert_eq!(resolve(&profile, no_env, |_| None).as_deref(), Some("plain"));
    }

    #[test]
    fn no_password_anywhere() {
        let err = resolve_password_with(&Profile::default(), "home", no_env, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { profile } if profile == "home"));
    }

    #[test]
    fn profile_overrides_defaults() {
        let profile = Profile {
            host: " 192.168.1.254 ".into(),
            use_tls: Some(false),
            timeout: Some(5),
            ..Profile::default()
        };
        let defaults = Defaults {
            refresh_rate: 90,
            ..Defaults::default()
        };
        let config =
            build_coordinator_config(&profile, &defaults, SecretString::from("pw".to_owned()))
                .unwrap();

        assert_eq!(config.host, "192.168.1.254");
        assert!(!config.use_tls);
        assert!(config.verify_ssl);
        assert_eq!(config.refresh_interval, Duration::from_secs(90));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_refresh_rate_is_rejected() {
        let profile = Profile {
            refresh_rate: Some(0),
            ..Profile::default()
        };
        let err = build_coordinator_config(
            &profile,
            &Defaults::default(),
            SecretString::from("pw".to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "refresh_rate"));
    }
}
