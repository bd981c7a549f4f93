/// Scan messages — sent from scan workers to the control thread via a
/// crossbeam channel.
///
/// Workers never touch the tree; these messages carry immutable descriptors
/// the control thread applies later.
use super::JobId;
use crate::model::EntryInfo;

#[derive(Debug)]
pub enum ScanProgress {
    /// A direct child of the job's directory was listed.
    Discovered { job: JobId, entry: EntryInfo },
    /// The job ended, whether exhausted, cancelled or unreadable.
    /// Always the last message of its job.
    Finished { job: JobId },
}

impl ScanProgress {
    /// Job this message belongs to.
    pub fn job(&self) -> JobId {
        match self {
            Self::Discovered { job, .. } | Self::Finished { job } => *job,
        }
    }
}
