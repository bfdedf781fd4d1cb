//! Driver-side open job list.

use std::{cmp::Reverse, sync::Arc};

use crate::{
    domain::{
        assignments::{AssignmentsServiceError, records::AssignmentRecord},
        jobs::records::{JobRecord, JobUuid},
    },
    realtime::RealtimeEvent,
};

/// Message shown to a driver who lost the race for a job.
pub const JOB_TAKEN_NOTICE: &str = "This job was just taken by another driver.";

/// Effect of applying an event to an [`OpenJobsView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    Added,
    Updated,
    Removed,
    Unchanged,
}

/// Effect of an accept attempt on an [`OpenJobsView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReconciliation {
    /// The driver won; the job left the open list.
    Accepted,
    /// Someone else won; the job was pruned and [`JOB_TAKEN_NOTICE`] applies.
    Taken,
    /// The attempt failed for another reason; the list is untouched.
    Kept,
}

/// Open jobs as one driver sees them, newest first.
#[derive(Debug, Clone, Default)]
pub struct OpenJobsView {
    jobs: Vec<Arc<JobRecord>>,
}

impl OpenJobsView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a fresh fetch.
    pub fn resync(&mut self, jobs: impl IntoIterator<Item = JobRecord>) {
        self.jobs = jobs
            .into_iter()
            .filter(JobRecord::is_open)
            .map(Arc::new)
            .collect();

        self.sort();
    }

    /// Fold a realtime event into the list.
    pub fn apply(&mut self, event: &RealtimeEvent) -> ViewChange {
        let RealtimeEvent::Job { job, .. } = event else {
            return ViewChange::Unchanged;
        };

        let existing = self.position(job.uuid);

        match (existing, job.is_open()) {
            (Some(index), true) => {
                if let Some(slot) = self.jobs.get_mut(index) {
                    *slot = Arc::clone(job);
                }

                ViewChange::Updated
            }
            (None, true) => {
                self.jobs.push(Arc::clone(job));
                self.sort();

                ViewChange::Added
            }
            (Some(index), false) => {
                self.jobs.remove(index);

                ViewChange::Removed
            }
            (None, false) => ViewChange::Unchanged,
        }
    }

    /// Drop a job another driver has taken.
    ///
    /// Returns `true` if the job was still listed.
    pub fn prune_taken(&mut self, job: JobUuid) -> bool {
        match self.position(job) {
            Some(index) => {
                self.jobs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Apply the outcome of this driver's accept attempt.
    pub fn reconcile_accept(
        &mut self,
        job: JobUuid,
        outcome: &Result<AssignmentRecord, AssignmentsServiceError>,
    ) -> AcceptReconciliation {
        match outcome {
            Ok(_) => {
                self.prune_taken(job);
                AcceptReconciliation::Accepted
            }
            Err(AssignmentsServiceError::AlreadyTaken | AssignmentsServiceError::NotFound) => {
                self.prune_taken(job);
                AcceptReconciliation::Taken
            }
            Err(_) => AcceptReconciliation::Kept,
        }
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, job: JobUuid) -> bool {
        self.position(job).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn position(&self, job: JobUuid) -> Option<usize> {
        self.jobs.iter().position(|record| record.uuid == job)
    }

    fn sort(&mut self) {
        self.jobs
            .sort_by_key(|job| Reverse((job.created_at, job.uuid)));
    }
}
