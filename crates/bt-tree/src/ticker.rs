//! Periodic tick driver.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::tree::{BehaviorTree, TickOutcome};

/// A tree shared between its driver and whoever inspects it.
pub type SharedTree = Arc<Mutex<BehaviorTree>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerExit {
    /// `stop()` was called or the handle was dropped.
    Cancelled,
    /// A tick found the tree stopped.
    TreeStopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerReport {
    pub exit: TickerExit,
    /// Ticks that evaluated the root, including failed ones.
    pub ticks: u64,
    /// Ticks whose evaluation returned an error.
    pub failed_ticks: u64,
    pub last_error: Option<String>,
}

/// Calls [`BehaviorTree::tick`] every `interval` until cancelled or the tree stops.
///
/// The first tick fires one interval after `start`. Ticks run under the tree's lock, one at a time;
/// a tick that overruns the interval causes the missed fires to be skipped, not queued. An error
/// from a tick is logged and only ends that tick.
pub struct Ticker;

impl Ticker {
    pub fn start(tree: SharedTree, interval: Duration) -> TickerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut report = TickerReport {
                exit: TickerExit::Cancelled,
                ticks: 0,
                failed_ticks: 0,
                last_error: None,
            };

            info!(interval_ms = interval.as_millis() as u64, "ticker started");
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        let outcome = tree.lock().tick();
                        match outcome {
                            Ok(TickOutcome::Ticked(_)) => report.ticks += 1,
                            Ok(TickOutcome::Stopped) => {
                                report.exit = TickerExit::TreeStopped;
                                break;
                            }
                            Err(err) => {
                                warn!(error = %err, "tick failed");
                                report.ticks += 1;
                                report.failed_ticks += 1;
                                report.last_error = Some(err.to_string());
                            }
                        }
                    }
                }
            }
            info!(ticks = report.ticks, exit = ?report.exit, "ticker finished");
            report
        });

        TickerHandle {
            shutdown_tx,
            handle,
        }
    }
}

pub struct TickerHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<TickerReport>,
}

impl TickerHandle {
    /// Cancel future ticks. A tick already in progress completes.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the driver to end on its own (tree stopped) or after `stop`.
    pub async fn join(self) -> TickerReport {
        let TickerHandle {
            shutdown_tx,
            handle,
        } = self;
        let report = finish(handle.await);
        drop(shutdown_tx);
        report
    }

    /// Wait for the driver to end, cancelling it if `cancel` completes first.
    pub async fn join_until(self, cancel: impl Future<Output = ()>) -> TickerReport {
        let TickerHandle {
            shutdown_tx,
            mut handle,
        } = self;
        tokio::select! {
            joined = &mut handle => return finish(joined),
            () = cancel => {
                let _ = shutdown_tx.send(true);
            }
        }
        finish(handle.await)
    }

    pub async fn stop_and_join(self) -> TickerReport {
        self.stop();
        self.join().await
    }
}

fn finish(joined: Result<TickerReport, tokio::task::JoinError>) -> TickerReport {
    joined.unwrap_or_else(|err| TickerReport {
        exit: TickerExit::Cancelled,
        ticks: 0,
        failed_ticks: 0,
        last_error: Some(err.to_string()),
    })
}
