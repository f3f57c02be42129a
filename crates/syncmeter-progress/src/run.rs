//! Run lifecycle - owns the aggregator for one synchronization run
//!
//! A [`ProgressRun`] is created when a sync run starts and dropped when it
//! ends. It feeds sync-engine events into its [`ProgressInfo`], drives the
//! 1 Hz recompute tick, and publishes a snapshot to the
//! [`ProgressDispatcher`] after every change.
//!
//! ## Flow
//!
//! ```text
//! sync engine ──→ ProgressRun ──→ Mutex<ProgressInfo>
//!                     │                   ▲
//!                     │             tick (1 Hz task)
//!                     ▼
//!             ProgressDispatcher ──→ observers (snapshots only)
//! ```
//!
//! Mutations come from a single writer. The lock only guarantees that
//! observers and the ticker see each update as a whole.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use syncmeter_core::{
    config::ProgressConfig,
    domain::{RunId, SyncFileItem},
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{dispatcher::ProgressDispatcher, info::ProgressInfo, snapshot::ProgressSnapshot};

/// Interval between rate recomputations; rates are per second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the background ticker task
struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Progress tracking for one synchronization run
pub struct ProgressRun {
    folder: String,
    run_id: RunId,
    info: Arc<Mutex<ProgressInfo>>,
    dispatcher: ProgressDispatcher,
    publish_partial_updates: bool,
    ticker: Option<Ticker>,
}

impl ProgressRun {
    /// Creates a run for `folder` publishing to `dispatcher`
    pub fn new(
        folder: impl Into<String>,
        dispatcher: ProgressDispatcher,
        config: &ProgressConfig,
    ) -> Self {
        let folder = folder.into();
        let run_id = RunId::new();
        info!(folder = %folder, run_id = %run_id, "Progress run created");

        Self {
            folder,
            run_id,
            info: Arc::new(Mutex::new(ProgressInfo::new())),
            dispatcher,
            publish_partial_updates: config.publish_partial_updates,
            ticker: None,
        }
    }

    /// Key of the folder this run synchronizes
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Identifier of this run
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    // ========================================================================
    // Event intake
    // ========================================================================

    /// Accounts for a discovered item; see [`ProgressInfo::adjust_totals_for_file`]
    pub fn adjust_totals_for_file(&self, item: &SyncFileItem) -> Arc<ProgressSnapshot> {
        let snapshot = {
            let mut info = lock(&self.info);
            info.adjust_totals_for_file(item);
            Arc::new(info.snapshot())
        };
        self.publish(snapshot)
    }

    /// Registers the start of a transfer
    pub fn report_file_started(&self, item: &SyncFileItem) -> Arc<ProgressSnapshot> {
        debug!(run_id = %self.run_id, path = %item.path(), size = item.size(), "File started");
        let snapshot = {
            let mut info = lock(&self.info);
            info.report_file_started(item);
            Arc::new(info.snapshot())
        };
        self.publish(snapshot)
    }

    /// Records partial progress of a transfer
    ///
    /// The snapshot is only broadcast when partial updates are enabled;
    /// otherwise observers pick the change up on the next tick.
    pub fn report_file_partial(
        &self,
        item: &SyncFileItem,
        completed_bytes: u64,
    ) -> Arc<ProgressSnapshot> {
        let snapshot = {
            let mut info = lock(&self.info);
            info.report_file_partial(item, completed_bytes);
            Arc::new(info.snapshot())
        };
        if self.publish_partial_updates {
            self.publish(snapshot)
        } else {
            snapshot
        }
    }

    /// Records that a transfer (or any other operation on `item`) finished
    pub fn report_file_completed(&self, item: &SyncFileItem) -> Arc<ProgressSnapshot> {
        debug!(
            run_id = %self.run_id,
            path = %item.path(),
            instruction = %item.instruction(),
            status = %item.status(),
            "File completed"
        );
        let snapshot = {
            let mut info = lock(&self.info);
            info.report_file_completed(item);
            Arc::new(info.snapshot())
        };
        self.publish(snapshot)
    }

    /// Recomputes rates once and publishes the result
    ///
    /// Called by the background ticker; callers that drive time themselves
    /// (replays, tests) may call it directly instead of [`start`](Self::start).
    pub fn tick(&self) -> Arc<ProgressSnapshot> {
        tick_and_publish(&self.info, &self.dispatcher, &self.folder, self.run_id)
    }

    /// Copies the current state
    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.info).snapshot()
    }

    fn publish(&self, snapshot: Arc<ProgressSnapshot>) -> Arc<ProgressSnapshot> {
        self.dispatcher
            .publish(&self.folder, self.run_id, Arc::clone(&snapshot));
        snapshot
    }

    // ========================================================================
    // Ticker lifecycle
    // ========================================================================

    /// Starts the 1 Hz ticker on the current tokio runtime
    ///
    /// The first tick fires one interval after the start. Calling `start`
    /// on a running ticker does nothing.
    pub fn start(&mut self) {
        if self.has_started() {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let info = Arc::clone(&self.info);
        let dispatcher = self.dispatcher.clone();
        let folder = self.folder.clone();
        let run_id = self.run_id;

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + TICK_INTERVAL;
            let mut interval = tokio::time::interval_at(start, TICK_INTERVAL);
            // Never burst to catch up: each tick must see a full second.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        tick_and_publish(&info, &dispatcher, &folder, run_id);
                    }
                }
            }
            debug!(run_id = %run_id, "Progress ticker stopped");
        });

        info!(folder = %self.folder, run_id = %self.run_id, "Progress ticker started");
        self.ticker = Some(Ticker { cancel, handle });
    }

    /// Returns true while the ticker is running
    pub fn has_started(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Stops the ticker and publishes a final snapshot
    pub async fn stop(&mut self) -> Arc<ProgressSnapshot> {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel.cancel();
            if let Err(e) = ticker.handle.await {
                warn!(run_id = %self.run_id, error = %e, "Progress ticker task failed");
            }
        }

        let snapshot = Arc::new(self.snapshot());
        info!(
            folder = %self.folder,
            run_id = %self.run_id,
            completed_files = snapshot.completed_files,
            total_files = snapshot.total_files,
            completed_bytes = snapshot.completed_bytes,
            total_bytes = snapshot.total_bytes,
            "Progress run stopped"
        );
        self.publish(snapshot)
    }
}

impl Drop for ProgressRun {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel.cancel();
        }
    }
}

/// Locks the aggregator, recovering from poisoning
///
/// Every mutation leaves `ProgressInfo` consistent, so a panic on another
/// thread cannot leave it half-updated.
fn lock(info: &Mutex<ProgressInfo>) -> MutexGuard<'_, ProgressInfo> {
    info.lock().unwrap_or_else(PoisonError::into_inner)
}

fn tick_and_publish(
    info: &Mutex<ProgressInfo>,
    dispatcher: &ProgressDispatcher,
    folder: &str,
    run_id: RunId,
) -> Arc<ProgressSnapshot> {
    let snapshot = {
        let mut info = lock(info);
        info.tick();
        Arc::new(info.snapshot())
    };
    dispatcher.publish(folder, run_id, Arc::clone(&snapshot));
    snapshot
}
