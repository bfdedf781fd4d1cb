//! Realtime change feed.
//!
//! Services publish committed changes to a [`RealtimeHub`]; subscribers hold a
//! [`Subscription`] scoped to one [`ChannelKey`]. Delivery is at-least-once from the
//! subscriber's point of view: a subscriber that falls behind is told so and is
//! expected to resynchronise from a fresh read.

mod channels;
mod events;
mod hub;
mod subscription;

pub use channels::{ChannelKey, InvalidChannelKey};
pub use events::{Change, RealtimeEvent, TypingSignal};
pub use hub::{DEFAULT_CHANNEL_CAPACITY, RealtimeHub};
pub use subscription::{ChannelError, Subscription};
