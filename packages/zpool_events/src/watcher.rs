use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::classify::LineClassifier;
use crate::dispatch::Dispatcher;
use crate::error::{Result, WatchError};
use crate::history::{HistorySource, history_lines};
use crate::paths::ZpoolCommand;
use crate::query::{scan_after_marker, scan_since};
use crate::tracker::DedupTracker;
use crate::types::PoolEvent;

/// Configuration for a [`PoolWatcher`]. Immutable after construction.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Pools to monitor.
    pub pools: Vec<String>,

    /// Interval between steady-state ticks.
    pub interval: Duration,

    /// If set, only events strictly after this time are delivered.
    pub since_time: Option<NaiveDateTime>,

    /// If set, nothing is delivered until a history line containing this
    /// command substring has been observed; the marker line itself is never
    /// delivered.
    pub since_event: Option<String>,

    /// Path to the zpool binary.
    pub zpool_cmd: ZpoolCommand,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            pools: Vec::new(),
            interval: Duration::from_secs(5),
            since_time: None,
            since_event: None,
            zpool_cmd: ZpoolCommand::Default,
        }
    }
}

/// Stop token for a running watcher.
///
/// `stop` is honored between ticks and also cancels an in-flight history
/// fetch; it never interrupts a handler mid-call.
#[derive(Debug, Clone)]
pub struct WatcherHandle {
    stop: watch::Sender<bool>,
}

impl WatcherHandle {
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

/// Watches the command history of one or more pools and delivers each new
/// lifecycle event exactly once to the registered handlers.
///
/// The run loop is strictly sequential: one pool at a time, one line at a
/// time, on whatever task `run` is awaited on. All tracker state is owned by
/// this instance, so multiple watchers can coexist. Handlers must be
/// registered before `run` starts; there is no internal lock around the
/// handler list.
///
/// Every tick re-reads each pool's full history. That is linear in history
/// length per pool per tick, which is acceptable while histories stay small
/// relative to the poll interval; switching to incremental reads would
/// change the dedup semantics and is deliberately not done here.
pub struct PoolWatcher {
    config: WatcherConfig,
    classifier: LineClassifier,
    tracker: DedupTracker,
    dispatcher: Dispatcher,
    history: HistorySource,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl PoolWatcher {
    pub fn new(config: WatcherConfig) -> Self {
        let tracker = DedupTracker::new(config.since_event.clone(), config.since_time);
        let history = HistorySource::new(config.zpool_cmd.clone());
        let (stop_tx, stop_rx) = watch::channel(false);

        Self {
            config,
            classifier: LineClassifier::new(),
            tracker,
            dispatcher: Dispatcher::new(),
            history,
            stop_tx,
            stop_rx,
        }
    }

    /// Registers an event handler. Must be called before [`run`](Self::run).
    pub fn add_handler<F>(&mut self, handler: F)
    where
        F: Fn(&PoolEvent) + Send + 'static,
    {
        self.dispatcher.add_handler(handler);
    }

    pub fn stop_handle(&self) -> WatcherHandle {
        WatcherHandle {
            stop: self.stop_tx.clone(),
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Runs the watcher until its [`WatcherHandle`] signals stop.
    ///
    /// One silent pass per pool first: it populates the dedup and marker
    /// state so that pre-existing history is not replayed, and dispatches
    /// nothing. After that, a fixed-interval loop re-scans every pool and
    /// dispatches whatever the tracker accepts. A failed fetch skips that
    /// pool for the tick; the next tick retries.
    pub async fn run(mut self) {
        info!("starting watcher for pools: {:?}", self.config.pools);

        for pool in self.config.pools.clone() {
            if *self.stop_rx.borrow() {
                return;
            }
            self.process_pool(&pool, true).await;
        }

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately; consume it so
        // steady state begins one full interval after initialization.
        ticker.tick().await;

        loop {
            let mut stop = self.stop_rx.clone();
            tokio::select! {
                _ = ticker.tick() => {
                    for pool in self.config.pools.clone() {
                        if *self.stop_rx.borrow() {
                            info!("watcher stopping");
                            return;
                        }
                        self.process_pool(&pool, false).await;
                    }
                }
                _ = stop.changed() => {
                    info!("watcher stopping");
                    return;
                }
            }
        }
    }

    /// One fetch-classify-filter-dispatch pass over a single pool.
    async fn process_pool(&mut self, pool: &str, initializing: bool) {
        let mut stop = self.stop_rx.clone();
        let fetched = tokio::select! {
            result = self.history.fetch(pool) => result,
            _ = stop.changed() => return,
        };

        let output = match fetched {
            Ok(output) => output,
            Err(err) => {
                warn!("error getting history for pool {}: {}", pool, err);
                return;
            }
        };

        for line in history_lines(&output) {
            if !self.tracker.marker_gate(line) {
                continue;
            }
            let Some(event) = self.classifier.classify(line, pool) else {
                continue;
            };
            if self.tracker.admit(&event, initializing) {
                debug!("new event on {}: {}", pool, event.target);
                self.dispatcher.dispatch(&event);
            }
        }
    }

    /// Returns all events strictly after `since`, across every configured
    /// pool, in pool iteration order.
    ///
    /// Stateless: does not consult or update the live dedup state, so it is
    /// safe to call concurrently with a running watcher. A fetch failure
    /// fails the whole query.
    pub async fn events_since(&self, since: NaiveDateTime) -> Result<Vec<PoolEvent>> {
        let mut events = Vec::new();
        for pool in &self.config.pools {
            let output = self.history.fetch(pool).await?;
            events.extend(scan_since(&self.classifier, pool, &output, since));
        }
        Ok(events)
    }

    /// Returns all events after the first history line containing `marker`,
    /// skipping the marker line itself. Fails with
    /// [`WatchError::MarkerNotFound`] when no configured pool's history
    /// contains the marker.
    pub async fn events_since_marker(&self, marker: &str) -> Result<Vec<PoolEvent>> {
        let mut events = Vec::new();
        let mut found = false;

        for pool in &self.config.pools {
            let output = self.history.fetch(pool).await?;
            let (pool_events, now_found) =
                scan_after_marker(&self.classifier, pool, &output, marker, found);
            found = now_found;
            events.extend(pool_events);
        }

        if !found {
            return Err(WatchError::MarkerNotFound(marker.to_string()));
        }
        Ok(events)
    }

    /// Returns events from the last `window`, anchored at the local clock
    /// (history timestamps are local time).
    pub async fn recent_events(&self, window: Duration) -> Result<Vec<PoolEvent>> {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        let since = Local::now()
            .naive_local()
            .checked_sub_signed(window)
            .unwrap_or(NaiveDateTime::MIN);
        self.events_since(since).await
    }
}
