//! Production ticker: credits the garden's production rate on a fixed cadence.
//!
//! The ticker runs as a single tokio task, started with [`start_ticker`] and
//! controlled through a [`TickerHandle`], the same shape as the outbound
//! message scheduler it grew out of.
//!
//! Cadence:
//! * Each firing credits `rate * interval / 1s`.
//! * The sub-unit remainder is carried in milli-harvest between firings, so
//!   the effective rate is exactly `rate` per second for any interval.
//! * The default interval is one second (whole-second ticks).
//!
//! While the production rate is zero the task parks on the garden's change
//! channel and does not fire. When the rate turns positive it restarts with
//! a fresh interval. Credits run synchronously under the store lock, so two
//! credits never overlap.

use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::shared::{Garden, GardenChange};
use crate::metrics;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickerStats {
    pub ticks: u64,
    pub credited: u64,
    /// Milli-harvest waiting to be credited on a later tick.
    pub carry_milli: u64,
}

enum TickerCommand {
    Snapshot(oneshot::Sender<TickerStats>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Clone, Debug)]
pub struct TickerHandle {
    tx: mpsc::UnboundedSender<TickerCommand>,
}

impl TickerHandle {
    /// Stop the ticker and wait for the task to acknowledge.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(TickerCommand::Shutdown(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn snapshot(&self) -> Option<TickerStats> {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(TickerCommand::Snapshot(tx)).is_ok() {
            rx.await.ok()
        } else {
            None
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Milli-harvest produced by `rate` over `interval`.
fn milli_for(rate: u64, interval: Duration) -> u64 {
    let millis = interval.as_millis().min(u64::MAX as u128) as u64;
    rate.saturating_mul(millis)
}

pub fn start_ticker(garden: Garden, interval: Duration) -> TickerHandle {
    let interval = if interval.is_zero() {
        DEFAULT_TICK_INTERVAL
    } else {
        interval
    };
    let (tx, mut rx) = mpsc::unbounded_channel::<TickerCommand>();
    let handle = TickerHandle { tx };
    let mut changes: watch::Receiver<GardenChange> = garden.subscribe();

    tokio::spawn(async move {
        let mut stats = TickerStats::default();
        let mut rate = changes.borrow_and_update().production_rate;
        let mut timer = interval_at(Instant::now() + interval, interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("production ticker started (interval={}ms)", interval.as_millis());

        loop {
            if rate == 0 {
                // Parked: wait for production to start or for a command.
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        rate = changes.borrow_and_update().production_rate;
                        if rate > 0 {
                            debug!("production resumed at {}/s", rate);
                            timer.reset();
                        }
                    }
                    cmd = rx.recv() => match cmd {
                        Some(TickerCommand::Snapshot(resp)) => { let _ = resp.send(stats); }
                        Some(TickerCommand::Shutdown(done)) => { let _ = done.send(()); break; }
                        None => break,
                    },
                }
                continue;
            }

            tokio::select! {
                _ = timer.tick() => {
                    stats.carry_milli = stats.carry_milli.saturating_add(milli_for(rate, interval));
                    let whole = stats.carry_milli / 1000;
                    stats.carry_milli %= 1000;
                    garden.credit(whole);
                    stats.ticks += 1;
                    stats.credited = stats.credited.saturating_add(whole);
                    metrics::inc_ticks();
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    rate = changes.borrow_and_update().production_rate;
                }
                cmd = rx.recv() => match cmd {
                    Some(TickerCommand::Snapshot(resp)) => { let _ = resp.send(stats); }
                    Some(TickerCommand::Shutdown(done)) => { let _ = done.send(()); break; }
                    None => break,
                },
            }
        }
        debug!(
            "production ticker stopped after {} ticks ({} credited)",
            stats.ticks, stats.credited
        );
    });

    handle
}
