//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bbox_config::ConfigError;
use bbox_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(bbox::connection_failed),
        help(
            "Check that the router is reachable.\n\
             Reason: {reason}\n\
             Try: bbox check --insecure, or --no-tls for a plain HTTP address"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Router request timed out")]
    #[diagnostic(
        code(bbox::timeout),
        help("Increase timeout with --timeout or check router responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(bbox::auth_failed),
        help(
            "The router rejected the admin password.\n\
             Run: bbox config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(bbox::no_credentials),
        help(
            "Store one with: bbox config set-password --profile {profile}\n\
             Or set the BBOX_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Router refused the operation: {message}")]
    #[diagnostic(code(bbox::forbidden))]
    Forbidden { message: String },

    // ── Router data ──────────────────────────────────────────────────

    #[error("Router error: {message}")]
    #[diagnostic(code(bbox::router_error))]
    Router { message: String },

    #[error("Unexpected '{domain}' response: {reason}")]
    #[diagnostic(
        code(bbox::shape_fault),
        help("The router firmware may use a response layout this tool does not know.")
    )]
    Shape { domain: String, reason: String },

    #[error("Conflicting values at '{path}' across device fragments")]
    #[diagnostic(code(bbox::merge_conflict))]
    MergeConflict { path: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(bbox::not_found),
        help("Run: bbox {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bbox::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bbox::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error(transparent)]
    #[diagnostic(code(bbox::config))]
    Config(Box<ConfigError>),

    #[error("Internal error: {0}")]
    #[diagnostic(code(bbox::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(bbox::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(bbox::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::MergeConflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthExpired { .. } => Self::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout => Self::Timeout,

            CoreError::Rejected { message } => Self::Forbidden { message },

            CoreError::Transport { message } => Self::Router { message },

            CoreError::ShapeFault { domain, reason } => Self::Shape { domain, reason },

            CoreError::MergeConflict { path, .. } => Self::MergeConflict { path },

            CoreError::CoordinatorStopped => Self::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "the router session was closed".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
                path: bbox_config::config_path().display().to_string(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}
