/// Scan coordinator — dispatches directory scans and reconciles their results.
///
/// Lives on the control thread next to the tree. Jobs run on a rayon pool and
/// report back through one unbounded crossbeam channel; messages from a single
/// job arrive in the order the worker sent them, so a job's `Finished` always
/// follows its last `Discovered`.
///
/// # Stale messages
///
/// The job → node map only holds jobs that are still in flight. A reset
/// cancels every token and clears the map without waiting for workers, so
/// messages can keep arriving for jobs the map no longer knows. Those are
/// dropped (and counted); they never reach the new tree.
use super::job::ScanJob;
use super::progress::ScanProgress;
use super::{CancelToken, JobId};
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::index::{ModelEvent, ModelIndex, Notifier};
use crate::model::{FileTree, NodeId, ScanStatus};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Running totals since the coordinator was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub jobs_started: u64,
    pub jobs_finished: u64,
    pub entries_applied: u64,
    pub stale_dropped: u64,
}

/// Bookkeeping for one in-flight job.
#[derive(Debug)]
struct InFlight {
    node: NodeId,
    cancel: CancelToken,
}

pub struct ScanCoordinator {
    pool: rayon::ThreadPool,
    tx: Sender<ScanProgress>,
    rx: Receiver<ScanProgress>,
    jobs: HashMap<JobId, InFlight>,
    next_job: u64,
    stats: ScanStats,
    follow_symlinks: bool,
    include_hidden: bool,
}

impl ScanCoordinator {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let threads = config.effective_worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("lookfor-scan-{i}"))
            .build()?;
        info!(threads, "scan worker pool ready");

        let (tx, rx) = crossbeam_channel::unbounded();
        Ok(Self {
            pool,
            tx,
            rx,
            jobs: HashMap::new(),
            next_job: 1,
            stats: ScanStats::default(),
            follow_symlinks: config.follow_symlinks,
            include_hidden: config.include_hidden,
        })
    }

    /// Start listing `node`'s children.
    ///
    /// A file is marked `Finished` on the spot. A directory is marked
    /// `Running` and a job is submitted. Nodes that already started a scan (or
    /// are stale) are left alone, so one node never gets two jobs.
    pub fn run_scan(&mut self, tree: &mut FileTree, node: NodeId) -> Option<JobId> {
        let target = tree.get(node)?;
        if target.status != ScanStatus::NotScanned {
            return None;
        }
        if !target.is_dir() {
            tree.node_mut(node).status = ScanStatus::Finished;
            return None;
        }
        let path = tree.full_path(node)?;

        let id = JobId(self.next_job);
        self.next_job += 1;
        let cancel = CancelToken::new();
        let job = ScanJob::new(id, path, cancel.clone())
            .follow_symlinks(self.follow_symlinks)
            .include_hidden(self.include_hidden);

        debug!(job = %id, path = %job.path().display(), "scan started");
        tree.node_mut(node).status = ScanStatus::Running;
        self.jobs.insert(id, InFlight { node, cancel });
        self.stats.jobs_started += 1;

        let tx = self.tx.clone();
        self.pool.spawn(move || job.run(tx));
        Some(id)
    }

    /// Cancel every in-flight job, forget them, and discard the tree.
    ///
    /// Does not wait for workers to notice.
    pub fn reset(&mut self, tree: &mut FileTree) {
        if !self.jobs.is_empty() {
            debug!(cancelled = self.jobs.len(), "cancelling in-flight scans");
        }
        for (_, job) in self.jobs.drain() {
            job.cancel.cancel();
        }
        tree.clear();
    }

    /// Next pending message, without blocking.
    pub fn try_next(&self) -> Option<ScanProgress> {
        self.rx.try_recv().ok()
    }

    /// Next pending message, waiting at most `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<ScanProgress> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Apply one worker message to the tree.
    ///
    /// Each discovered entry becomes one new row, bracketed by begin/end insert
    /// notifications. Returns `true` if the tree changed.
    pub fn apply(
        &mut self,
        msg: ScanProgress,
        tree: &mut FileTree,
        notifier: &mut Notifier,
    ) -> bool {
        match msg {
            ScanProgress::Discovered { job, entry } => {
                let Some(node) = self.target(job, tree) else {
                    trace!(%job, name = %entry.name, "dropping entry from stale job");
                    self.stats.stale_dropped += 1;
                    return false;
                };

                let target = tree.node(node);
                let parent = ModelIndex::of_node(target, node, 0);
                let row = target.child_count();

                notifier.emit(ModelEvent::RowsAboutToBeInserted {
                    parent,
                    first: row,
                    last: row,
                });
                tree.add_child(node, entry);
                notifier.emit(ModelEvent::RowsInserted {
                    parent,
                    first: row,
                    last: row,
                });

                self.stats.entries_applied += 1;
                true
            }
            ScanProgress::Finished { job } => {
                let Some(node) = self.target(job, tree) else {
                    trace!(%job, "ignoring completion of stale job");
                    self.stats.stale_dropped += 1;
                    return false;
                };

                self.jobs.remove(&job);
                tree.node_mut(node).status = ScanStatus::Finished;
                self.stats.jobs_finished += 1;
                debug!(%job, children = tree.node(node).child_count(), "scan applied");
                true
            }
        }
    }

    /// Mapped node for `job`, if the job is in flight and its node is live.
    fn target(&self, job: JobId, tree: &FileTree) -> Option<NodeId> {
        let node = self.jobs.get(&job)?.node;
        tree.contains(node).then_some(node)
    }

    /// Number of jobs whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Sender feeding the control-thread channel, for injecting messages in tests.
    #[cfg(test)]
    pub(crate) fn sender(&self) -> Sender<ScanProgress> {
        self.tx.clone()
    }
}

impl Drop for ScanCoordinator {
    fn drop(&mut self) {
        for job in self.jobs.values() {
            job.cancel.cancel();
        }
    }
}
