//! Background nonce refresh
//!
//! Refreshes on start (mount), on reconnect/focus events sent through the
//! handle, and on a fixed interval. Which events cause a refresh is decided
//! by [`NonceRefreshConfig`].

use super::{NonceTracker, RefreshTrigger};
use crate::api::{MempoolApi, NonceApi};
use crate::config::NonceRefreshConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

const TRIGGER_QUEUE: usize = 16;

/// Handle to a running refresh loop. Dropping it stops the loop.
pub struct NoncePoller {
    triggers: mpsc::Sender<RefreshTrigger>,
    task: JoinHandle<()>,
}

impl NoncePoller {
    pub fn spawn<N, M>(tracker: Arc<NonceTracker<N, M>>, config: NonceRefreshConfig) -> Self
    where
        N: NonceApi + 'static,
        M: MempoolApi + 'static,
    {
        let (triggers, rx) = mpsc::channel(TRIGGER_QUEUE);
        let task = tokio::spawn(run(tracker, config, rx));
        Self { triggers, task }
    }

    /// Request a refresh. Returns false once the loop has stopped.
    pub async fn trigger(&self, trigger: RefreshTrigger) -> bool {
        self.triggers.send(trigger).await.is_ok()
    }

    /// Stop the loop and wait for it to finish
    pub async fn shutdown(self) {
        drop(self.triggers);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Nonce poller task failed");
        }
    }
}

fn allows(config: &NonceRefreshConfig, trigger: RefreshTrigger) -> bool {
    match trigger {
        RefreshTrigger::Mount => config.refresh_on_mount,
        RefreshTrigger::Reconnect => config.refresh_on_reconnect,
        RefreshTrigger::Focus => config.refresh_on_focus,
        RefreshTrigger::Interval | RefreshTrigger::Manual => true,
    }
}

async fn run<N, M>(
    tracker: Arc<NonceTracker<N, M>>,
    config: NonceRefreshConfig,
    mut triggers: mpsc::Receiver<RefreshTrigger>,
) where
    N: NonceApi,
    M: MempoolApi,
{
    if config.refresh_on_mount {
        refresh(&tracker, RefreshTrigger::Mount).await;
    }

    let mut ticker = config.interval().map(|period| {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        tokio::select! {
            trigger = triggers.recv() => match trigger {
                Some(trigger) if allows(&config, trigger) => refresh(&tracker, trigger).await,
                Some(trigger) => tracing::trace!(?trigger, "Refresh trigger disabled"),
                None => break,
            },
            _ = tick(&mut ticker) => refresh(&tracker, RefreshTrigger::Interval).await,
        }
    }

    tracing::debug!(address = %tracker.address(), "Nonce poller stopped");
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn refresh<N: NonceApi, M: MempoolApi>(tracker: &NonceTracker<N, M>, trigger: RefreshTrigger) {
    if let Err(e) = tracker.refresh(trigger).await {
        tracing::warn!(
            address = %tracker.address(),
            ?trigger,
            error = %e,
            "Failed to refresh account nonce"
        );
    }
}
