//! Presence sweeper.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use haulage_app::domain::presence::PresenceService;

/// Periodically expire typing signals whose holders went quiet.
pub(crate) fn spawn_sweeper(presence: Arc<dyn PresenceService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + every, every);

        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;

            presence.sweep_expired();
        }
    })
}
