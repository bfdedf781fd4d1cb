//! Channel keys.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{domain::jobs::records::JobUuid, session::DealerUuid};

const DEALER_JOBS: &str = "dealer-jobs";
const OPEN_JOBS: &str = "open-jobs";
const JOB: &str = "job";
const JOB_MESSAGES: &str = "job-messages";
const JOB_PRESENCE: &str = "job-presence";

/// Scope a subscriber listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    /// Every job owned by one dealer.
    DealerJobs(DealerUuid),
    /// Jobs entering or leaving the open pool.
    OpenJobs,
    /// A single job.
    Job(JobUuid),
    /// Messages exchanged on a job.
    JobMessages(JobUuid),
    /// Typing signals on a job.
    JobPresence(JobUuid),
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DealerJobs(dealer) => write!(f, "{DEALER_JOBS}:{dealer}"),
            Self::OpenJobs => f.write_str(OPEN_JOBS),
            Self::Job(job) => write!(f, "{JOB}:{job}"),
            Self::JobMessages(job) => write!(f, "{JOB_MESSAGES}:{job}"),
            Self::JobPresence(job) => write!(f, "{JOB_PRESENCE}:{job}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid channel key: {0}")]
pub struct InvalidChannelKey(pub String);

impl FromStr for ChannelKey {
    type Err = InvalidChannelKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidChannelKey(value.to_string());

        if value == OPEN_JOBS {
            return Ok(Self::OpenJobs);
        }

        let (scope, id) = value.split_once(':').ok_or_else(invalid)?;

        match scope {
            DEALER_JOBS => id.parse().map(Self::DealerJobs).map_err(|_| invalid()),
            JOB => id.parse().map(Self::Job).map_err(|_| invalid()),
            JOB_MESSAGES => id.parse().map(Self::JobMessages).map_err(|_| invalid()),
            JOB_PRESENCE => id.parse().map(Self::JobPresence).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}
