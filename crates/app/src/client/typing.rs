//! Typing signal debouncing.

use std::time::{Duration, Instant};

/// Default spacing between typing signals.
pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_secs(2);

/// Signal to send to the presence service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingAction {
    Started,
    Stopped,
}

/// Turns keystrokes into sparse start/stop signals.
///
/// While input continues a `Started` signal is repeated at most once per interval, which
/// keeps the server-side signal from lapsing. `Stopped` follows one interval after the
/// last keystroke.
#[derive(Debug, Clone)]
pub struct TypingDebouncer {
    interval: Duration,
    last_sent: Option<Instant>,
    last_input: Option<Instant>,
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_INTERVAL)
    }
}

impl TypingDebouncer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
            last_input: None,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.last_input.is_some()
    }

    /// Record a keystroke.
    pub fn on_input(&mut self, now: Instant) -> Option<TypingAction> {
        self.last_input = Some(now);

        let due = self
            .last_sent
            .is_none_or(|sent| now.saturating_duration_since(sent) >= self.interval);

        due.then(|| {
            self.last_sent = Some(now);
            TypingAction::Started
        })
    }

    /// Check for an idle timeout.
    pub fn poll(&mut self, now: Instant) -> Option<TypingAction> {
        let last_input = self.last_input?;

        (now.saturating_duration_since(last_input) >= self.interval).then(|| self.reset())
    }

    /// When [`poll`](Self::poll) should next be called.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.last_input.map(|input| input + self.interval)
    }

    /// Stop immediately, e.g. when the message is sent.
    pub fn flush(&mut self) -> Option<TypingAction> {
        self.is_active().then(|| self.reset())
    }

    fn reset(&mut self) -> TypingAction {
        self.last_input = None;
        self.last_sent = None;

        TypingAction::Stopped
    }
}
