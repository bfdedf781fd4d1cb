//! Job state machine.

use jiff::Timestamp;
use thiserror::Error;

use crate::domain::jobs::records::{JobRecord, JobState, JobStatus};

/// Every legal `(from, to)` edge of the job lifecycle.
pub const ALLOWED_TRANSITIONS: [(JobStatus, JobStatus); 6] = [
    (JobStatus::Open, JobStatus::Assigned),
    (JobStatus::Open, JobStatus::Cancelled),
    (JobStatus::Assigned, JobStatus::InProgress),
    (JobStatus::Assigned, JobStatus::Cancelled),
    (JobStatus::InProgress, JobStatus::Completed),
    (JobStatus::Completed, JobStatus::Archived),
];

/// Attempted edge outside [`ALLOWED_TRANSITIONS`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot move job from {from} to {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Stored columns that no [`JobState`] can represent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("job status {status} is inconsistent with its lifecycle timestamps")]
pub struct InconsistentJobState {
    pub status: JobStatus,
}

impl JobStatus {
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        ALLOWED_TRANSITIONS.contains(&(self, target))
    }
}

impl JobState {
    /// Apply a transition at `at`.
    ///
    /// Recorded timestamps never go backwards: `at` is raised to the latest timestamp
    /// already present on the state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any edge outside [`ALLOWED_TRANSITIONS`].
    pub fn transition(&self, target: JobStatus, at: Timestamp) -> Result<Self, InvalidTransition> {
        let at = self.latest_timestamp().map_or(at, |latest| at.max(latest));

        match (*self, target) {
            (Self::Open, JobStatus::Assigned) => Ok(Self::Assigned { accepted_at: at }),
            (Self::Open, JobStatus::Cancelled) => Ok(Self::Cancelled {
                accepted_at: None,
                ended_at: at,
            }),
            (Self::Assigned { accepted_at }, JobStatus::InProgress) => Ok(Self::InProgress {
                accepted_at,
                started_at: at,
            }),
            (Self::Assigned { accepted_at }, JobStatus::Cancelled) => Ok(Self::Cancelled {
                accepted_at: Some(accepted_at),
                ended_at: at,
            }),
            (
                Self::InProgress {
                    accepted_at,
                    started_at,
                },
                JobStatus::Completed,
            ) => Ok(Self::Completed {
                accepted_at,
                started_at,
                ended_at: at,
            }),
            (
                Self::Completed {
                    accepted_at,
                    started_at,
                    ended_at,
                },
                JobStatus::Archived,
            ) => Ok(Self::Archived {
                accepted_at,
                started_at,
                ended_at,
            }),
            (state, to) => Err(InvalidTransition {
                from: state.status(),
                to,
            }),
        }
    }

    /// Rebuild a state from its stored columns.
    ///
    /// # Errors
    ///
    /// Returns [`InconsistentJobState`] when the timestamps do not match the status.
    pub fn from_columns(
        status: JobStatus,
        accepted_at: Option<Timestamp>,
        started_at: Option<Timestamp>,
        ended_at: Option<Timestamp>,
    ) -> Result<Self, InconsistentJobState> {
        let state = match (status, accepted_at, started_at, ended_at) {
            (JobStatus::Open, None, None, None) => Self::Open,
            (JobStatus::Assigned, Some(accepted_at), None, None) => Self::Assigned { accepted_at },
            (JobStatus::InProgress, Some(accepted_at), Some(started_at), None) => {
                Self::InProgress {
                    accepted_at,
                    started_at,
                }
            }
            (JobStatus::Completed, Some(accepted_at), Some(started_at), Some(ended_at)) => {
                Self::Completed {
                    accepted_at,
                    started_at,
                    ended_at,
                }
            }
            (JobStatus::Cancelled, accepted_at, None, Some(ended_at)) => Self::Cancelled {
                accepted_at,
                ended_at,
            },
            (JobStatus::Archived, Some(accepted_at), Some(started_at), Some(ended_at)) => {
                Self::Archived {
                    accepted_at,
                    started_at,
                    ended_at,
                }
            }
            (status, ..) => return Err(InconsistentJobState { status }),
        };

        Ok(state)
    }

    fn latest_timestamp(&self) -> Option<Timestamp> {
        [self.accepted_at(), self.started_at(), self.ended_at()]
            .into_iter()
            .flatten()
            .max()
    }
}

impl JobRecord {
    /// Compute the state this job would move to.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for an illegal edge.
    pub fn next_state(&self, target: JobStatus, at: Timestamp) -> Result<JobState, InvalidTransition> {
        self.state.transition(target, at.max(self.created_at))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn ts(value: &str) -> Result<Timestamp, jiff::Error> {
        value.parse()
    }

    fn state_in(status: JobStatus, at: Timestamp) -> JobState {
        match status {
            JobStatus::Open => JobState::Open,
            JobStatus::Assigned => JobState::Assigned { accepted_at: at },
            JobStatus::InProgress => JobState::InProgress {
                accepted_at: at,
                started_at: at,
            },
            JobStatus::Completed => JobState::Completed {
                accepted_at: at,
                started_at: at,
                ended_at: at,
            },
            JobStatus::Cancelled => JobState::Cancelled {
                accepted_at: None,
                ended_at: at,
            },
            JobStatus::Archived => JobState::Archived {
                accepted_at: at,
                started_at: at,
                ended_at: at,
            },
        }
    }

    #[test]
    fn every_pair_outside_the_edge_set_is_rejected() -> TestResult {
        let at = ts("2026-03-01T09:00:00Z")?;
        let later = ts("2026-03-01T10:00:00Z")?;

        for from in JobStatus::ALL {
            for to in JobStatus::ALL {
                let state = state_in(from, at);
                let result = state.transition(to, later);

                if ALLOWED_TRANSITIONS.contains(&(from, to)) {
                    let next = result?;
                    assert_eq!(next.status(), to, "{from} -> {to} should land on {to}");
                } else {
                    assert_eq!(
                        result,
                        Err(InvalidTransition { from, to }),
                        "{from} -> {to} should be rejected"
                    );
                }
            }
        }

        Ok(())
    }

    #[test]
    fn terminal_states_only_allow_archiving_completed_jobs() {
        for from in JobStatus::ALL.into_iter().filter(|status| status.is_terminal()) {
            let targets: Vec<JobStatus> = JobStatus::ALL
                .into_iter()
                .filter(|to| from.can_transition_to(*to))
                .collect();

            if from == JobStatus::Completed {
                assert_eq!(targets, vec![JobStatus::Archived]);
            } else {
                assert!(targets.is_empty(), "{from} should have no outgoing edges");
            }
        }
    }

    #[test]
    fn transitions_record_their_timestamp_field() -> TestResult {
        let accepted = ts("2026-03-01T09:00:00Z")?;
        let started = ts("2026-03-01T09:30:00Z")?;
        let ended = ts("2026-03-01T11:00:00Z")?;

        let assigned = JobState::Open.transition(JobStatus::Assigned, accepted)?;
        let in_progress = assigned.transition(JobStatus::InProgress, started)?;
        let completed = in_progress.transition(JobStatus::Completed, ended)?;

        assert_eq!(completed.accepted_at(), Some(accepted));
        assert_eq!(completed.started_at(), Some(started));
        assert_eq!(completed.ended_at(), Some(ended));

        Ok(())
    }

    #[test]
    fn timestamps_never_move_backwards() -> TestResult {
        let accepted = ts("2026-03-01T09:00:00Z")?;
        let skewed = ts("2026-03-01T08:59:00Z")?;

        let started = JobState::Assigned {
            accepted_at: accepted,
        }
        .transition(JobStatus::InProgress, skewed)?;

        assert_eq!(started.started_at(), Some(accepted));

        Ok(())
    }

    #[test]
    fn cancelling_an_open_job_has_no_acceptance() -> TestResult {
        let at = ts("2026-03-01T09:00:00Z")?;

        let cancelled = JobState::Open.transition(JobStatus::Cancelled, at)?;

        assert_eq!(
            cancelled,
            JobState::Cancelled {
                accepted_at: None,
                ended_at: at
            }
        );

        Ok(())
    }

    #[test]
    fn from_columns_rejects_completed_without_ended_at() -> TestResult {
        let at = ts("2026-03-01T09:00:00Z")?;

        let result = JobState::from_columns(JobStatus::Completed, Some(at), Some(at), None);

        assert_eq!(
            result,
            Err(InconsistentJobState {
                status: JobStatus::Completed
            })
        );

        Ok(())
    }

    #[test]
    fn from_columns_accepts_cancelled_after_assignment() -> TestResult {
        let accepted = ts("2026-03-01T09:00:00Z")?;
        let ended = ts("2026-03-01T09:10:00Z")?;

        let state = JobState::from_columns(JobStatus::Cancelled, Some(accepted), None, Some(ended))?;

        assert_eq!(state.accepted_at(), Some(accepted));
        assert_eq!(state.ended_at(), Some(ended));

        Ok(())
    }

    #[test]
    fn status_round_trips_through_str() -> TestResult {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>()?, status);
        }

        assert!("done".parse::<JobStatus>().is_err());

        Ok(())
    }
}
