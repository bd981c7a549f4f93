/// Scanner module — lazy, one-directory-at-a-time background listing.
///
/// A [`job::ScanJob`] lists the direct children of one directory on a rayon
/// worker and streams [`progress::ScanProgress`] messages back over an
/// unbounded crossbeam channel. The [`coordinator::ScanCoordinator`] owns the
/// receiving end, the job → node map, and the cancellation tokens; it applies
/// messages to the tree on the control thread.
pub mod coordinator;
pub mod job;
pub mod progress;

pub use coordinator::{ScanCoordinator, ScanStats};
pub use job::ScanJob;
pub use progress::ScanProgress;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle identifying one scan job. Never reused within a coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Cooperative cancellation flag shared between the coordinator and a worker.
///
/// Setting it never blocks and never joins the worker; the job notices the
/// flag before emitting its next entry.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the job to stop as soon as possible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
