//! In-memory presence store.

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use rustc_hash::FxHashMap;

use crate::{
    domain::{assignments::records::AssignmentUuid, jobs::records::JobUuid},
    session::Actor,
};

/// Default time a typing signal stays live without a refresh.
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PresenceEntry {
    assignment: AssignmentUuid,
    expires_at: Instant,
}

/// Typing participant whose signal lapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredPresence {
    pub job: JobUuid,
    pub assignment: AssignmentUuid,
    pub actor: Actor,
}

/// Who is typing where, with a time-to-live per entry.
#[derive(Debug)]
pub struct PresenceStore {
    ttl: Duration,
    entries: Mutex<FxHashMap<(JobUuid, Actor), PresenceEntry>>,
}

impl Default for PresenceStore {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_TTL)
    }
}

impl PresenceStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, FxHashMap<(JobUuid, Actor), PresenceEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `actor` as typing until `now + ttl`.
    ///
    /// Returns `true` when the actor was not already typing.
    pub fn start(&self, job: JobUuid, assignment: AssignmentUuid, actor: Actor, now: Instant) -> bool {
        let previous = self.entries().insert(
            (job, actor),
            PresenceEntry {
                assignment,
                expires_at: now + self.ttl,
            },
        );

        previous.is_none_or(|entry| entry.expires_at <= now)
    }

    /// Clear `actor`'s typing state.
    ///
    /// Returns `true` when the actor was typing.
    pub fn stop(&self, job: JobUuid, actor: Actor, now: Instant) -> bool {
        self.entries()
            .remove(&(job, actor))
            .is_some_and(|entry| entry.expires_at > now)
    }

    #[must_use]
    pub fn is_typing(&self, job: JobUuid, actor: Actor, now: Instant) -> bool {
        self.entries()
            .get(&(job, actor))
            .is_some_and(|entry| entry.expires_at > now)
    }

    /// Participants currently typing on `assignment`.
    #[must_use]
    pub fn typing(&self, job: JobUuid, assignment: AssignmentUuid, now: Instant) -> Vec<Actor> {
        let mut actors: Vec<Actor> = self
            .entries()
            .iter()
            .filter(|((entry_job, _), entry)| {
                *entry_job == job && entry.assignment == assignment && entry.expires_at > now
            })
            .map(|((_, actor), _)| *actor)
            .collect();

        actors.sort_by_key(|actor| actor.role().as_str());

        actors
    }

    /// Remove lapsed entries and report them.
    pub fn prune(&self, now: Instant) -> Vec<ExpiredPresence> {
        let mut expired = Vec::new();

        self.entries().retain(|(job, actor), entry| {
            let live = entry.expires_at > now;

            if !live {
                expired.push(ExpiredPresence {
                    job: *job,
                    assignment: entry.assignment,
                    actor: *actor,
                });
            }

            live
        });

        expired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DealerUuid, DriverUuid};

    fn store() -> PresenceStore {
        PresenceStore::new(Duration::from_secs(5))
    }

    #[test]
    fn typing_expires_after_ttl() {
        let store = store();
        let now = Instant::now();
        let job = JobUuid::new();
        let actor = Actor::Driver(DriverUuid::new());

        assert!(store.start(job, AssignmentUuid::new(), actor, now));
        assert!(store.is_typing(job, actor, now + Duration::from_secs(4)));
        assert!(!store.is_typing(job, actor, now + Duration::from_secs(5)));
    }

    #[test]
    fn refreshing_extends_without_reporting_a_new_start() {
        let store = store();
        let now = Instant::now();
        let job = JobUuid::new();
        let assignment = AssignmentUuid::new();
        let actor = Actor::Dealer(DealerUuid::new());

        assert!(store.start(job, assignment, actor, now));
        assert!(!store.start(job, assignment, actor, now + Duration::from_secs(3)));
        assert!(store.is_typing(job, actor, now + Duration::from_secs(7)));

        // Restarting after the entry lapsed counts as a new start.
        assert!(store.start(job, assignment, actor, now + Duration::from_secs(20)));
    }

    #[test]
    fn stop_reports_whether_actor_was_typing() {
        let store = store();
        let now = Instant::now();
        let job = JobUuid::new();
        let actor = Actor::Driver(DriverUuid::new());

        assert!(!store.stop(job, actor, now));

        store.start(job, AssignmentUuid::new(), actor, now);

        assert!(store.stop(job, actor, now));
        assert!(!store.is_typing(job, actor, now));
    }

    #[test]
    fn typing_lists_only_live_participants_of_the_assignment() {
        let store = store();
        let earlier = Instant::now();
        let now = earlier + Duration::from_secs(10);
        let job = JobUuid::new();
        let assignment = AssignmentUuid::new();
        let dealer = Actor::Dealer(DealerUuid::new());
        let driver = Actor::Driver(DriverUuid::new());

        store.start(job, assignment, driver, now);
        store.start(job, assignment, dealer, earlier);
        store.start(JobUuid::new(), assignment, Actor::Driver(DriverUuid::new()), now);

        assert_eq!(store.typing(job, assignment, now), vec![driver]);
    }

    #[test]
    fn prune_removes_and_reports_expired_entries() {
        let store = store();
        let now = Instant::now();
        let job = JobUuid::new();
        let assignment = AssignmentUuid::new();
        let actor = Actor::Driver(DriverUuid::new());

        store.start(job, assignment, actor, now);
        store.start(job, assignment, Actor::Dealer(DealerUuid::new()), now + Duration::from_secs(3));

        let expired = store.prune(now + Duration::from_secs(6));

        assert_eq!(
            expired,
            vec![ExpiredPresence {
                job,
                assignment,
                actor
            }]
        );
        assert_eq!(store.len(), 1);
    }
}
