//! Realtime Config

use std::{num::NonZeroUsize, time::Duration};

use clap::Args;
use haulage_app::context::RealtimeSettings;

/// Realtime channel and presence settings.
#[derive(Debug, Args)]
pub struct RealtimeConfig {
    /// Events buffered per channel before a slow subscriber is told to resync
    #[arg(long, env = "REALTIME_CHANNEL_CAPACITY", default_value = "256")]
    pub channel_capacity: NonZeroUsize,

    /// Lifetime of a typing signal that is not refreshed, in milliseconds
    #[arg(long, env = "TYPING_TTL_MS", default_value_t = 5_000)]
    pub typing_ttl_ms: u64,

    /// How often lapsed typing signals are swept, in milliseconds
    #[arg(long, env = "PRESENCE_SWEEP_MS", default_value_t = 1_000)]
    pub presence_sweep_ms: u64,

    /// Interval between keep-alive comments on idle event streams, in seconds
    #[arg(long, env = "SSE_KEEPALIVE_SECONDS", default_value_t = 15)]
    pub sse_keepalive_seconds: u64,
}

impl RealtimeConfig {
    /// Typing signal lifetime.
    #[must_use]
    pub fn typing_ttl(&self) -> Duration {
        Duration::from_millis(self.typing_ttl_ms)
    }

    /// Presence sweep interval, never shorter than 50ms.
    #[must_use]
    pub fn presence_sweep(&self) -> Duration {
        Duration::from_millis(self.presence_sweep_ms.max(50))
    }

    /// Keep-alive interval for event streams.
    #[must_use]
    pub fn sse_keepalive(&self) -> Duration {
        Duration::from_secs(self.sse_keepalive_seconds)
    }

    /// Settings handed to the app context.
    #[must_use]
    pub fn settings(&self) -> RealtimeSettings {
        RealtimeSettings {
            channel_capacity: self.channel_capacity.get(),
            typing_ttl: self.typing_ttl(),
        }
    }
}
