// ── Snapshot subscriptions ──
//
// Subscription handle for consuming refresh outcomes from the store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::RefreshStatus;

/// A subscription to refresh outcomes.
///
/// Provides point-in-time access and change notification via
/// `changed()` or by converting to a `Stream`.
pub struct SnapshotStream {
    current: RefreshStatus,
    receiver: watch::Receiver<RefreshStatus>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<RefreshStatus>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Status captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &RefreshStatus {
        &self.current
    }

    /// Latest status (may have changed since creation).
    pub fn latest(&self) -> RefreshStatus {
        self.receiver.borrow().clone()
    }

    /// Wait for the next cycle outcome.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<RefreshStatus> {
        self.receiver.changed().await.ok()?;
        let status = self.receiver.borrow_and_update().clone();
        self.current = status.clone();
        Some(status)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current status first, then one item per cycle outcome.
pub struct SnapshotWatchStream {
    inner: WatchStream<RefreshStatus>,
}

impl Stream for SnapshotWatchStream {
    type Item = RefreshStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
