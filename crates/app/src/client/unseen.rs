//! Unseen job counter.

use jiff::Timestamp;
use rustc_hash::FxHashSet;

use crate::{
    domain::jobs::records::{JobRecord, JobUuid},
    realtime::{Change, RealtimeEvent},
};

/// One-shot alert for the most recent unseen job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobAlert {
    pub job: JobUuid,
    pub pickup_address: String,
    pub delivery_address: String,
    pub created_at: Timestamp,
}

impl From<&JobRecord> for NewJobAlert {
    fn from(job: &JobRecord) -> Self {
        Self {
            job: job.uuid,
            pickup_address: job.pickup_address.clone(),
            delivery_address: job.delivery_address.clone(),
            created_at: job.created_at,
        }
    }
}

/// Local count of open jobs the driver has not looked at yet.
///
/// The server count is authoritative: [`reconcile`](Self::reconcile) overwrites whatever
/// was counted locally. Between reconciles the counter follows `OpenJobs` insert events.
/// Each job is counted at most once for the life of the tracker, so a redelivered insert
/// never moves the count after a reconcile or a checkpoint.
#[derive(Debug, Clone, Default)]
pub struct UnseenJobsTracker {
    count: u64,
    counted: FxHashSet<JobUuid>,
    alert: Option<NewJobAlert>,
}

impl UnseenJobsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Fold a realtime event in. Returns `true` when the count changed.
    pub fn observe(&mut self, event: &RealtimeEvent) -> bool {
        let RealtimeEvent::Job {
            change: Change::Insert,
            job,
        } = event
        else {
            return false;
        };

        if !job.is_open() || !self.counted.insert(job.uuid) {
            return false;
        }

        self.count = self.count.saturating_add(1);
        self.alert = Some(NewJobAlert::from(job.as_ref()));

        true
    }

    /// Take the pending alert, if any. Each alert is handed out once.
    pub fn take_alert(&mut self) -> Option<NewJobAlert> {
        self.alert.take()
    }

    /// Adopt the server's count.
    pub fn reconcile(&mut self, server_count: u64) {
        self.count = server_count;
    }

    /// Reset after the server checkpoint has advanced.
    pub fn mark_seen(&mut self) {
        self.count = 0;
        self.alert = None;
    }
}
