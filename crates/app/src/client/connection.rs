//! Reconnecting channel wrapper.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::realtime::{ChannelKey, RealtimeEvent, RealtimeHub, Subscription};

/// Connection state of a [`LiveChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// Waiting to make reconnect attempt number `attempt` (1-based).
    Reconnecting {
        attempt: u32,
    },
    Disconnected,
}

/// Backoff and give-up rules for reconnecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    /// Fraction of the delay added or removed at random, `0.0..=1.0`.
    pub jitter_factor: f64,
    /// Consecutive failed attempts after which the channel reports itself degraded.
    pub degraded_after: u32,
    /// Give up and disconnect after this many failed attempts.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            multiplier: 2,
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.1,
            degraded_after: 5,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt `attempt`, without jitter.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);

        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.delay(attempt);
        let jitter = self.jitter_factor.clamp(0.0, 1.0);

        if jitter == 0.0 {
            return delay;
        }

        let scale = rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter));

        delay.mul_f64(scale).min(self.max_delay)
    }
}

/// Item yielded by [`LiveChannel::next`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiveUpdate {
    /// Local state may have missed events; refetch before applying further events.
    ResyncRequired,
    Event(RealtimeEvent),
}

/// A subscription that survives lag and hub restarts.
///
/// Every (re)connect is announced with [`LiveUpdate::ResyncRequired`] before any event
/// from the new subscription.
#[derive(Debug)]
pub struct LiveChannel {
    hub: RealtimeHub,
    key: ChannelKey,
    policy: ReconnectPolicy,
    subscription: Option<Subscription>,
    state: ConnectionState,
    resync_pending: bool,
}

impl LiveChannel {
    #[must_use]
    pub fn connect(hub: RealtimeHub, key: ChannelKey, policy: ReconnectPolicy) -> Self {
        let mut channel = Self {
            hub,
            key,
            policy,
            subscription: None,
            state: ConnectionState::Reconnecting { attempt: 1 },
            resync_pending: false,
        };

        channel.try_subscribe();

        channel
    }

    #[must_use]
    pub const fn key(&self) -> ChannelKey {
        self.key
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether reconnecting has failed often enough to warn the user.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.state, ConnectionState::Reconnecting { attempt } if attempt > self.policy.degraded_after)
    }

    /// Next update, or `None` once disconnected.
    pub async fn next(&mut self) -> Option<LiveUpdate> {
        loop {
            match self.state {
                ConnectionState::Disconnected => return None,
                ConnectionState::Reconnecting { attempt } => {
                    sleep(self.policy.jittered_delay(attempt)).await;

                    if !self.try_subscribe() {
                        self.record_failure(attempt);
                    }
                }
                ConnectionState::Connected => {
                    if self.resync_pending {
                        self.resync_pending = false;
                        return Some(LiveUpdate::ResyncRequired);
                    }

                    let Some(subscription) = self.subscription.as_mut() else {
                        self.state = ConnectionState::Reconnecting { attempt: 1 };
                        continue;
                    };

                    match subscription.recv().await {
                        Ok(event) => return Some(LiveUpdate::Event(event)),
                        Err(error) => {
                            warn!(channel = %self.key, %error, "realtime channel interrupted");

                            self.subscription = None;
                            self.state = ConnectionState::Reconnecting { attempt: 1 };
                        }
                    }
                }
            }
        }
    }

    /// Stop listening. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        self.state = ConnectionState::Disconnected;
    }

    fn try_subscribe(&mut self) -> bool {
        if self.hub.is_closed() {
            return false;
        }

        self.subscription = Some(self.hub.subscribe(self.key));
        self.state = ConnectionState::Connected;
        self.resync_pending = true;

        debug!(channel = %self.key, "realtime channel connected");

        true
    }

    fn record_failure(&mut self, attempt: u32) {
        if self
            .policy
            .max_attempts
            .is_some_and(|max_attempts| attempt >= max_attempts)
        {
            info!(channel = %self.key, attempt, "giving up on realtime channel");

            self.state = ConnectionState::Disconnected;
            return;
        }

        self.state = ConnectionState::Reconnecting {
            attempt: attempt.saturating_add(1),
        };

        if attempt == self.policy.degraded_after {
            warn!(channel = %self.key, attempt, "realtime channel degraded");
        }
    }
}
