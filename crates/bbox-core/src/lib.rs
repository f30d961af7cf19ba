//! Data-refresh core between `bbox-api` and its consumers (CLI, home
//! automation hosts).
//!
//! - **[`Coordinator`]**: lifecycle facade.
//!   [`connect()`](Coordinator::connect) logs in, runs a first refresh
//!   cycle, then spawns the periodic refresh task and the command
//!   processor. Cycles are single-flight; concurrent
//!   [`refresh()`](Coordinator::refresh) calls share one outcome.
//!
//! - **Normalizer / merger / isolator** ([`normalize`], [`merge`],
//!   [`isolate`]): collapse each endpoint's list of fragments into one
//!   object, deep-merge multi-fragment domains, and degrade optional
//!   domains to `{}` on failure while critical ones fail the cycle.
//!
//! - **[`SnapshotStore`]**: the current [`Snapshot`] behind an atomic
//!   swap, with a `watch` channel announcing every publish and every
//!   failure through [`SnapshotStream`].
//!
//! - **[`Command`]**: typed write requests routed through an `mpsc`
//!   channel to the coordinator's command processor.
//!
//! - **Entity tables** ([`entity`]) and [`DeviceRecord`]: what a host
//!   platform exposes from a snapshot.

pub mod api;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod device;
pub mod diagnostics;
pub mod domain;
pub mod entity;
pub mod error;
pub mod isolate;
pub mod merge;
pub mod normalize;
pub mod setup;
pub mod snapshot;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::{BboxConnector, Connector, RouterApi};
pub use command::{Command, CommandResult};
pub use config::CoordinatorConfig;
pub use coordinator::{ConnectionState, Coordinator};
pub use device::DeviceRecord;
pub use domain::{DEFAULT_DOMAINS, DomainSpec};
pub use entity::BoxIdentity;
pub use error::CoreError;
pub use setup::validate;
pub use snapshot::Snapshot;
pub use store::{RefreshStatus, SnapshotStore};
pub use stream::SnapshotStream;

pub use bbox_api::{Endpoint, WifiBand};
