//! Async client for the Bouygues Bbox router management API.
//!
//! The router exposes a session-authenticated JSON API under `/api/v1/`.
//! Every read endpoint answers with a list of object fragments, and this
//! crate hands those bodies back verbatim as [`serde_json::Value`];
//! collapsing them into records is done by `bbox-core`.
//!
//! ```no_run
//! use bbox_api::{BboxClient, Endpoint, TransportConfig};
//! use secrecy::SecretString;
//!
//! # async fn demo() -> Result<(), bbox_api::Error> {
//! let base = BboxClient::url_for_host("mabbox.bytel.fr", true)?;
//! let client = BboxClient::new(base, &TransportConfig::default())?;
//! client.login(&SecretString::from("hunter2".to_owned())).await?;
//! let hosts = client.fetch(Endpoint::ConnectedDevices).await?;
//! # let _ = hosts;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod commands;
pub mod endpoint;
pub mod error;
pub mod transport;

pub use client::BboxClient;
pub use commands::WifiBand;
pub use endpoint::Endpoint;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
