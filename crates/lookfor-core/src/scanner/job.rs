/// Single-directory scan job.
///
/// Lists the direct children of one directory and streams a descriptor per
/// child, followed by exactly one `Finished` message. Runs on a pool worker,
/// never on the control thread.
///
/// # Failure policy
///
/// An unreadable or vanished directory produces no entries, only `Finished`.
/// Entries that fail mid-listing are skipped. Nothing is reported as an error:
/// the user sees a directory that finished scanning with fewer (or no) children.
use super::progress::ScanProgress;
use super::{CancelToken, JobId};
use crate::model::EntryInfo;
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ScanJob {
    id: JobId,
    path: PathBuf,
    cancel: CancelToken,
    follow_symlinks: bool,
    include_hidden: bool,
}

impl ScanJob {
    pub fn new(id: JobId, path: PathBuf, cancel: CancelToken) -> Self {
        Self {
            id,
            path,
            cancel,
            follow_symlinks: true,
            include_hidden: true,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazy sequence of child descriptors. `.` and `..` never appear.
    ///
    /// Empty when the directory cannot be opened.
    pub fn entries(&self) -> impl Iterator<Item = EntryInfo> + '_ {
        let listing = match std::fs::read_dir(&self.path) {
            Ok(listing) => Some(listing),
            Err(err) => {
                debug!(path = %self.path.display(), %err, "directory unreadable, scanning as empty");
                None
            }
        };

        listing
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .map(|entry| EntryInfo::from_dir_entry(&entry, self.follow_symlinks))
            .filter(|info| self.include_hidden || !info.is_hidden())
    }

    /// Stream every entry to `tx`, then `Finished`.
    ///
    /// The token is checked before each entry. A closed channel means nobody is
    /// listening any more, so the job simply stops.
    pub fn run(self, tx: Sender<ScanProgress>) {
        let mut emitted = 0u64;
        for entry in self.entries() {
            if self.cancel.is_cancelled() {
                debug!(job = %self.id, emitted, "scan cancelled");
                break;
            }
            if tx.send(ScanProgress::Discovered { job: self.id, entry }).is_err() {
                return;
            }
            emitted += 1;
        }
        debug!(job = %self.id, path = %self.path.display(), emitted, "scan finished");
        let _ = tx.send(ScanProgress::Finished { job: self.id });
    }
}
