// ── Core error types ──
//
// Cycle-level faults raised by the refresh core. Consumers never see
// HTTP status codes or JSON parse failures directly: the
// `From<bbox_api::Error>` impl folds transport-layer errors into the
// variants below.

use serde_json::Value;
use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so that a single cycle outcome can be handed to every caller
/// coalesced into that cycle.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Data-shape errors ────────────────────────────────────────────
    /// A response did not have the list-of-fragments shape its domain
    /// requires.
    #[error("Unexpected response shape for `{domain}`: {reason}")]
    ShapeFault { domain: String, reason: String },

    /// Two fragments of the same domain disagree at `path`.
    #[error("Conflicting values at `{path}`: {left} vs {right}")]
    MergeConflict {
        path: String,
        left: Value,
        right: Value,
    },

    // ── Transport errors ─────────────────────────────────────────────
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The router no longer accepts the credential. Retrying will not
    /// help; the password must be re-entered.
    #[error("Authentication expired: {message}")]
    AuthExpired { message: String },

    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Router request timed out")]
    Timeout,

    #[error("Operation rejected by router: {message}")]
    Rejected { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Coordinator is not running")]
    CoordinatorStopped,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the host should prompt for a new credential instead of
    /// waiting for the next tick.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    pub(crate) fn shape(domain: &str, reason: impl Into<String>) -> Self {
        Self::ShapeFault {
            domain: domain.to_owned(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bbox_api::Error> for CoreError {
    fn from(err: bbox_api::Error) -> Self {
        match err {
            bbox_api::Error::Authentication { message } => CoreError::AuthExpired { message },
            bbox_api::Error::Forbidden { message } => CoreError::Rejected { message },
            bbox_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            bbox_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            bbox_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            bbox_api::Error::Api { status, message } => CoreError::Transport {
                message: format!("HTTP {status}: {message}"),
            },
            bbox_api::Error::UnexpectedResponse(message) => CoreError::Transport { message },
            bbox_api::Error::Deserialization { message, body: _ } => CoreError::Transport {
                message: format!("Deserialization error: {message}"),
            },
        }
    }
}
