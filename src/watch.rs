//! Headless reminder loop: loads the list, ticks once a second and prints
//! reminders until interrupted.

use chrono::Local;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::client::BackendClient;
use crate::config::Config;
use crate::notify::TerminalSurface;
use crate::scheduler::TICK_INTERVAL;
use crate::session::Session;

pub async fn run_watch(config: &Config) -> anyhow::Result<()> {
    let client = BackendClient::new(&config.backend.url)?;
    let mut session = Session::new(
        client,
        TerminalSurface,
        &config.alerts,
        config.sync.mirror_snapshots,
    );
    session.start();
    info!(backend = %config.backend.url, "watching for reminders, Ctrl-C to stop");

    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.tick(Local::now().naive_local());
            }
            Some(outcome) = session.next_outcome() => session.apply(outcome),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.shutdown();
    Ok(())
}
