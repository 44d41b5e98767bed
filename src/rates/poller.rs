//! Polls a `RateSource` on a fixed interval in a background task.
//!
//! The first fetch happens immediately, then one per interval until the `PollHandle` is cancelled
//! or dropped. Results are published through a `tokio::sync::watch` channel. A fetch that is
//! still in flight when the handle is cancelled is abandoned and its result is never published.
//! There is no retry on failure other than the next scheduled tick.

use crate::rates::{RateProvider, RateSnapshot, RateSource};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// What the poller has seen so far.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct PollState {
    /// The latest successfully fetched snapshot.
    pub snapshot: Option<RateSnapshot>,
    /// An advisory message from the latest fetch, if it failed. Cleared by the next success.
    pub error: Option<String>,
    /// How many fetches have completed, successful or not.
    pub attempts: u64,
}

/// Controls a running poller. Dropping the handle stops the poller too.
pub struct PollHandle {
    state: watch::Receiver<PollState>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Spawns a task that fetches from `source` now and then every `period`.
pub fn start_polling(source: Box<dyn RateSource>, period: Duration) -> PollHandle {
    let (state_tx, state_rx) = watch::channel(PollState::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let provider = RateProvider::new(source);
    debug!("Polling exchange rates every {}s", period.as_secs_f64());
    let task = tokio::spawn(run(provider, period, state_tx, shutdown_rx));
    PollHandle {
        state: state_rx,
        shutdown: shutdown_tx,
        task,
    }
}

impl PollHandle {
    /// A copy of the current state.
    pub fn latest(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// A receiver that can be used to watch for updates independently of the handle.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Waits for the next completed fetch and returns the new state. Returns `None` once the
    /// poller has stopped.
    pub async fn changed(&mut self) -> Option<PollState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Stops the poller and waits for its task to finish. Nothing is published after this
    /// returns, even if a fetch was in flight.
    pub async fn cancel(self) {
        // An error here means the task is already gone.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("The rate poller did not shut down cleanly: {e}");
        }
        debug!("Rate poller stopped");
    }
}

async fn run(
    mut provider: RateProvider,
    period: Duration,
    state: watch::Sender<PollState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // `changed` also returns when the handle has been dropped.
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                debug!("Cancelled during a fetch, discarding its result");
                break;
            }
            outcome = provider.refresh() => outcome.cloned(),
        };

        if *shutdown.borrow() {
            break;
        }

        state.send_modify(|s| {
            s.attempts += 1;
            match outcome {
                Ok(snapshot) => {
                    debug!("Fetched {} exchange rates", snapshot.len());
                    s.snapshot = Some(snapshot);
                    s.error = None;
                }
                Err(e) => {
                    warn!("{e}");
                    s.error = Some(e.to_string());
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{FetchError, StaticRates};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    /// Answers with a scripted sequence of results, then repeats the last one.
    struct Scripted(Mutex<VecDeque<Result<RateSnapshot, FetchError>>>);

    #[async_trait::async_trait]
    impl RateSource for Scripted {
        async fn fetch(&self) -> Result<RateSnapshot, FetchError> {
            let mut script = self.0.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    }

    /// Signals when a fetch starts and then waits to be released.
    struct Gated {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl RateSource for Gated {
        async fn fetch(&self) -> Result<RateSnapshot, FetchError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(RateSnapshot::new([("USD", Decimal::ONE)], Utc::now()))
        }
    }

    fn usd_eur(eur: i64) -> RateSnapshot {
        RateSnapshot::new(
            [("USD", Decimal::ONE), ("EUR", Decimal::new(eur, 2))],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_first_fetch_is_immediate() {
        let mut handle = start_polling(Box::new(StaticRates::default()), Duration::from_secs(3600));
        let state = timeout(WAIT, handle.changed()).await.unwrap().unwrap();
        assert_eq!(state.attempts, 1);
        assert!(state.error.is_none());
        assert_eq!(state.snapshot.unwrap().len(), 4);
        handle.cancel().await;
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let first = usd_eur(90);
        let script = VecDeque::from(vec![
            Ok(first.clone()),
            Err(FetchError::Rejected("quota-reached".to_string())),
        ]);
        let mut handle = start_polling(
            Box::new(Scripted(Mutex::new(script))),
            Duration::from_millis(200),
        );

        let ok = timeout(WAIT, handle.changed()).await.unwrap().unwrap();
        assert_eq!(ok.snapshot.as_ref(), Some(&first));

        let failed = timeout(WAIT, handle.changed()).await.unwrap().unwrap();
        assert_eq!(failed.snapshot.as_ref(), Some(&first));
        assert_eq!(
            failed.error.as_deref(),
            Some("Failed to fetch exchange rates: quota-reached")
        );
        assert!(failed.attempts >= 2);
        handle.cancel().await;
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let script = VecDeque::from(vec![
            Err(FetchError::Transport("timed out".to_string())),
            Ok(usd_eur(91)),
        ]);
        let mut handle = start_polling(
            Box::new(Scripted(Mutex::new(script))),
            Duration::from_millis(200),
        );

        let failed = timeout(WAIT, handle.changed()).await.unwrap().unwrap();
        assert!(failed.snapshot.is_none());
        assert!(failed.error.is_some());

        let ok = timeout(WAIT, handle.changed()).await.unwrap().unwrap();
        assert!(ok.error.is_none());
        assert_eq!(ok.snapshot.unwrap().rate("EUR"), Some(Decimal::new(91, 2)));
        handle.cancel().await;
    }

    #[tokio::test]
    async fn test_cancel_discards_in_flight_fetch() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let handle = start_polling(
            Box::new(Gated {
                started: started.clone(),
                release: release.clone(),
            }),
            Duration::from_millis(10),
        );
        let watcher = handle.subscribe();

        timeout(WAIT, started.notified()).await.unwrap();
        handle.cancel().await;
        release.notify_one();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let state = watcher.borrow().clone();
        assert_eq!(state, PollState::default());
    }

    #[tokio::test]
    async fn test_no_updates_after_cancel() {
        let mut handle = start_polling(Box::new(StaticRates::default()), Duration::from_millis(5));
        timeout(WAIT, handle.changed()).await.unwrap().unwrap();
        let mut watcher = handle.subscribe();
        handle.cancel().await;

        let attempts = watcher.borrow_and_update().attempts;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(watcher.borrow().attempts, attempts);
        // The sender is gone with the task, so waiting for a change ends immediately.
        assert!(watcher.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_drop_stops_polling() {
        let handle = start_polling(Box::new(StaticRates::default()), Duration::from_millis(5));
        let mut watcher = handle.subscribe();
        drop(handle);
        let ended = timeout(WAIT, async {
            while watcher.changed().await.is_ok() {}
        })
        .await;
        assert!(ended.is_ok());
    }
}
