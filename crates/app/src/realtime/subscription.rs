//! Subscriptions.

use std::sync::Weak;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::realtime::{channels::ChannelKey, events::RealtimeEvent, hub::HubInner};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Events were dropped because the subscriber fell behind.
    #[error("subscriber missed {0} events")]
    Lagged(u64),

    #[error("channel closed")]
    Closed,
}

/// Live subscription to one [`ChannelKey`].
///
/// Dropping the subscription unsubscribes it.
#[derive(Debug)]
pub struct Subscription {
    key: ChannelKey,
    receiver: Option<broadcast::Receiver<RealtimeEvent>>,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub(super) fn new(
        key: ChannelKey,
        receiver: broadcast::Receiver<RealtimeEvent>,
        hub: Weak<HubInner>,
    ) -> Self {
        Self {
            key,
            receiver: Some(receiver),
            hub,
        }
    }

    pub(super) fn detached(key: ChannelKey) -> Self {
        Self {
            key,
            receiver: None,
            hub: Weak::new(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> ChannelKey {
        self.key
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Wait for the next event.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Lagged`] when events were dropped for this subscriber and
    /// [`ChannelError::Closed`] once the subscription or hub is gone.
    pub async fn recv(&mut self) -> Result<RealtimeEvent, ChannelError> {
        let receiver = self.receiver.as_mut().ok_or(ChannelError::Closed)?;

        receiver.recv().await.map_err(|error| match error {
            RecvError::Lagged(missed) => ChannelError::Lagged(missed),
            RecvError::Closed => ChannelError::Closed,
        })
    }

    /// Take the next buffered event without waiting.
    ///
    /// # Errors
    ///
    /// Same as [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Result<Option<RealtimeEvent>, ChannelError> {
        let receiver = self.receiver.as_mut().ok_or(ChannelError::Closed)?;

        match receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Lagged(missed)) => Err(ChannelError::Lagged(missed)),
            Err(TryRecvError::Closed) => Err(ChannelError::Closed),
        }
    }

    /// Stop listening. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        let Some(receiver) = self.receiver.take() else {
            return;
        };

        drop(receiver);

        if let Some(hub) = self.hub.upgrade() {
            hub.release(self.key);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
