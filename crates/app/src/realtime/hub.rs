//! In-process fan-out hub.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use rustc_hash::FxHashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::{
    domain::{
        jobs::records::{JobRecord, JobStatus},
        messages::records::MessageRecord,
    },
    realtime::{
        channels::ChannelKey,
        events::{Change, RealtimeEvent, TypingSignal},
        subscription::Subscription,
    },
};

/// Default per-channel buffer before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
pub(super) struct HubInner {
    capacity: usize,
    closed: AtomicBool,
    channels: Mutex<FxHashMap<ChannelKey, broadcast::Sender<RealtimeEvent>>>,
}

impl HubInner {
    fn channels(&self) -> MutexGuard<'_, FxHashMap<ChannelKey, broadcast::Sender<RealtimeEvent>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the channel for `key` once nobody listens on it.
    pub(super) fn release(&self, key: ChannelKey) {
        let mut channels = self.channels();

        if channels
            .get(&key)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&key);
            trace!(channel = %key, "released realtime channel");
        }
    }
}

/// Publishes committed changes to scoped subscribers.
///
/// Publishing never blocks: a subscriber whose buffer is full loses the oldest events
/// and observes [`ChannelError::Lagged`](super::ChannelError::Lagged) on its next receive.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl RealtimeHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                capacity: capacity.max(1),
                closed: AtomicBool::new(false),
                channels: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Listen on `key`.
    ///
    /// Subscribing to a closed hub yields a subscription that reports
    /// [`ChannelError::Closed`](super::ChannelError::Closed) immediately.
    #[must_use]
    pub fn subscribe(&self, key: ChannelKey) -> Subscription {
        if self.is_closed() {
            return Subscription::detached(key);
        }

        let receiver = self
            .inner
            .channels()
            .entry(key)
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .subscribe();

        debug!(channel = %key, "realtime subscription opened");

        Subscription::new(key, receiver, Arc::downgrade(&self.inner))
    }

    /// Deliver `event` to every current subscriber of `key`.
    ///
    /// Returns how many subscribers the event reached.
    pub fn publish(&self, key: ChannelKey, event: RealtimeEvent) -> usize {
        let sender = self.inner.channels().get(&key).cloned();

        let delivered = sender.map_or(0, |sender| sender.send(event).unwrap_or(0));

        trace!(channel = %key, delivered, "published realtime event");

        delivered
    }

    /// Fan a job change out to its dealer, the job itself, and the open pool.
    pub fn publish_job(&self, change: Change, job: &JobRecord) -> usize {
        let event = RealtimeEvent::job(change, job.clone());
        let mut delivered = self.publish(ChannelKey::DealerJobs(job.dealer_uuid), event.clone());

        delivered += self.publish(ChannelKey::Job(job.uuid), event.clone());

        // The open pool also needs to hear about jobs leaving it.
        if matches!(
            job.status(),
            JobStatus::Open | JobStatus::Assigned | JobStatus::Cancelled
        ) {
            delivered += self.publish(ChannelKey::OpenJobs, event);
        }

        delivered
    }

    pub fn publish_message(&self, change: Change, message: &MessageRecord) -> usize {
        self.publish(
            ChannelKey::JobMessages(message.job_uuid),
            RealtimeEvent::message(change, message.clone()),
        )
    }

    pub fn publish_typing(&self, signal: TypingSignal) -> usize {
        self.publish(
            ChannelKey::JobPresence(signal.job),
            RealtimeEvent::Typing(signal),
        )
    }

    /// Number of channels with at least one live subscriber.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.inner.channels().len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Close every channel. Subscribers observe
    /// [`ChannelError::Closed`](super::ChannelError::Closed) once drained.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.channels().clear();

        debug!("realtime hub closed");
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{assignments::records::AssignmentUuid, jobs::records::JobUuid},
        realtime::ChannelError,
        session::{Actor, DriverUuid},
    };

    fn typing(job: JobUuid, typing: bool) -> TypingSignal {
        TypingSignal {
            job,
            assignment: AssignmentUuid::new(),
            actor: Actor::Driver(DriverUuid::new()),
            typing,
        }
    }

    #[tokio::test]
    async fn subscribers_only_see_their_channel() -> TestResult {
        let hub = RealtimeHub::new(8);
        let watched = JobUuid::new();
        let other = JobUuid::new();

        let mut subscription = hub.subscribe(ChannelKey::JobPresence(watched));

        assert_eq!(hub.publish_typing(typing(other, true)), 0);
        assert_eq!(hub.publish_typing(typing(watched, true)), 1);

        let event = subscription.recv().await?;

        assert!(matches!(event, RealtimeEvent::Typing(signal) if signal.job == watched));
        assert_eq!(subscription.try_recv()?, None);

        Ok(())
    }

    #[tokio::test]
    async fn slow_subscribers_observe_lag() -> TestResult {
        let hub = RealtimeHub::new(2);
        let job = JobUuid::new();

        let mut subscription = hub.subscribe(ChannelKey::JobPresence(job));

        for _ in 0..5 {
            hub.publish_typing(typing(job, true));
        }

        assert_eq!(subscription.recv().await, Err(ChannelError::Lagged(3)));

        Ok(())
    }

    #[test]
    fn unsubscribe_is_idempotent_and_prunes_channel() {
        let hub = RealtimeHub::new(4);
        let key = ChannelKey::JobMessages(JobUuid::new());

        let mut first = hub.subscribe(key);
        let mut second = hub.subscribe(key);

        assert_eq!(hub.channel_count(), 1);

        first.unsubscribe();
        first.unsubscribe();

        assert_eq!(hub.channel_count(), 1);

        second.unsubscribe();

        assert_eq!(hub.channel_count(), 0);
        assert!(!second.is_active());
    }

    #[test]
    fn dropping_a_subscription_releases_the_channel() {
        let hub = RealtimeHub::new(4);

        {
            let _subscription = hub.subscribe(ChannelKey::OpenJobs);
            assert_eq!(hub.channel_count(), 1);
        }

        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn closing_the_hub_ends_subscriptions() {
        let hub = RealtimeHub::new(4);
        let mut subscription = hub.subscribe(ChannelKey::OpenJobs);

        hub.close();

        assert_eq!(subscription.recv().await, Err(ChannelError::Closed));

        let mut late = hub.subscribe(ChannelKey::OpenJobs);

        assert_eq!(late.recv().await, Err(ChannelError::Closed));
    }

    #[test]
    fn publishing_without_subscribers_reaches_nobody() {
        let hub = RealtimeHub::new(4);

        assert_eq!(hub.publish_typing(typing(JobUuid::new(), false)), 0);
        assert_eq!(hub.channel_count(), 0);
    }
}
