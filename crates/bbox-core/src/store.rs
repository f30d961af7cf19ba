// ── Snapshot store ──
//
// Holds the current snapshot behind an `ArcSwapOption` so readers load
// it without locking, and announces every cycle outcome (publish or
// failure) on a `watch` channel.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::snapshot::Snapshot;
use crate::stream::SnapshotStream;

/// Outcome of the most recent refresh cycle, as seen by subscribers.
#[derive(Debug, Clone, Default)]
pub struct RefreshStatus {
    /// Number of the last cycle that completed, successfully or not.
    pub cycle: u64,
    /// Current snapshot. A failed cycle leaves the previous one here.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Why the last cycle failed; `None` after a successful one.
    pub last_failure: Option<CoreError>,
}

impl RefreshStatus {
    /// Whether the last completed cycle published a snapshot.
    pub fn is_ok(&self) -> bool {
        self.cycle > 0 && self.last_failure.is_none()
    }
}

/// Current snapshot plus change notification.
pub struct SnapshotStore {
    current: ArcSwapOption<Snapshot>,
    status: watch::Sender<RefreshStatus>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (status, _) = watch::channel(RefreshStatus::default());
        Self {
            current: ArcSwapOption::empty(),
            status,
        }
    }

    /// The current snapshot, if any cycle has succeeded yet.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Status of the last completed cycle.
    pub fn status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }

    /// Replace the current snapshot and notify subscribers.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let cycle = snapshot.cycle();
        self.current.store(Some(Arc::clone(&snapshot)));
        self.status.send_modify(|status| {
            status.cycle = cycle;
            status.snapshot = Some(Arc::clone(&snapshot));
            status.last_failure = None;
        });
        debug!(cycle, domains = snapshot.domains().len(), "snapshot published");
        snapshot
    }

    /// Record a failed cycle. The current snapshot is left untouched.
    pub(crate) fn report_failure(&self, cycle: u64, error: CoreError) {
        self.status.send_modify(|status| {
            status.cycle = cycle;
            status.last_failure = Some(error);
        });
    }

    /// Subscribe to cycle outcomes.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.status.subscribe())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
