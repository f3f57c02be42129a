//! Progress broadcast hub
//!
//! [`ProgressDispatcher`] republishes snapshots from running syncs to any
//! number of observers (UI, logging, IPC). It is a plain value owned by
//! whatever composes run lifecycles; clone it to share it.
//!
//! ## Design Notes
//!
//! - Backed by `tokio::sync::broadcast`: every subscriber sees every event,
//!   slow subscribers lag and skip ahead instead of blocking the engine.
//! - Publishing never fails. With no subscribers the event is dropped.
//! - Events for an empty folder key are dropped; a run without a target
//!   has nobody to report to.

use std::sync::Arc;

use syncmeter_core::domain::RunId;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

use crate::snapshot::ProgressSnapshot;

/// A snapshot tagged with the run and folder it belongs to
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Key of the synchronized folder or account
    pub folder: String,
    /// Run the snapshot was taken from
    pub run_id: RunId,
    /// The progress snapshot itself
    pub snapshot: Arc<ProgressSnapshot>,
}

// ============================================================================
// IProgressObserver trait
// ============================================================================

/// Port trait for components that consume progress events
///
/// Implementations are driven by [`ProgressDispatcher::attach`]. Errors are
/// logged and otherwise ignored; a failing observer never stalls a sync.
#[async_trait::async_trait]
pub trait IProgressObserver: Send + Sync {
    /// Handles one progress event
    async fn on_progress(&self, event: &ProgressEvent) -> anyhow::Result<()>;
}

// ============================================================================
// ProgressDispatcher
// ============================================================================

/// Fan-out hub for progress snapshots
#[derive(Debug, Clone)]
pub struct ProgressDispatcher {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressDispatcher {
    /// Creates a dispatcher buffering up to `capacity` events per subscriber
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns a receiver for all events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publishes a snapshot for `folder`
    ///
    /// Returns the number of subscribers that received it (0 when the
    /// folder key is empty or nobody listens).
    pub fn publish(&self, folder: &str, run_id: RunId, snapshot: Arc<ProgressSnapshot>) -> usize {
        if folder.is_empty() {
            debug!(run_id = %run_id, "Dropping progress event without folder key");
            return 0;
        }

        let event = ProgressEvent {
            folder: folder.to_string(),
            run_id,
            snapshot,
        };

        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => {
                debug!(folder = %folder, "No progress subscribers");
                0
            }
        }
    }

    /// Forwards every event to `observer` on a background task
    ///
    /// The task ends once every clone of this dispatcher has been dropped.
    pub fn attach(&self, observer: Arc<dyn IProgressObserver>) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = observer.on_progress(&event).await {
                            warn!(
                                folder = %event.folder,
                                run_id = %event.run_id,
                                error = %e,
                                "Progress observer failed"
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Progress observer lagging, skipped events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Progress dispatcher closed, observer detached");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for ProgressDispatcher {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::info::ProgressInfo;

    use super::*;

    fn snapshot() -> Arc<ProgressSnapshot> {
        Arc::new(ProgressInfo::new().snapshot())
    }

    /// Records the folder of every event; fails on demand
    struct RecordingObserver {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl IProgressObserver for RecordingObserver {
        async fn on_progress(&self, event: &ProgressEvent) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(event.folder.clone());
            if self.fail {
                anyhow::bail!("observer unavailable");
            }
            Ok(())
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let dispatcher = ProgressDispatcher::new(4);
        assert_eq!(dispatcher.publish("Documents", RunId::new(), snapshot()), 0);
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let dispatcher = ProgressDispatcher::new(4);
        let mut rx1 = dispatcher.subscribe();
        let mut rx2 = dispatcher.subscribe();
        let run_id = RunId::new();

        assert_eq!(dispatcher.publish("Documents", run_id, snapshot()), 2);

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.folder, "Documents");
        assert_eq!(e1.run_id, run_id);
        assert!(Arc::ptr_eq(&e1.snapshot, &e2.snapshot));
    }

    #[tokio::test]
    async fn test_empty_folder_is_dropped() {
        let dispatcher = ProgressDispatcher::new(4);
        let mut rx = dispatcher.subscribe();

        assert_eq!(dispatcher.publish("", RunId::new(), snapshot()), 0);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let dispatcher = ProgressDispatcher::new(0);
        let _rx = dispatcher.subscribe();
        assert_eq!(dispatcher.publish("x", RunId::new(), snapshot()), 1);
    }

    #[tokio::test]
    async fn test_attach_forwards_until_closed() {
        let dispatcher = ProgressDispatcher::new(8);
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
            fail: false,
        });
        let handle = dispatcher.attach(observer.clone());
        assert_eq!(dispatcher.subscriber_count(), 1);

        dispatcher.publish("a", RunId::new(), snapshot());
        dispatcher.publish("b", RunId::new(), snapshot());
        drop(dispatcher);

        handle.await.unwrap();
        assert_eq!(*observer.seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failing_observer_keeps_receiving() {
        let dispatcher = ProgressDispatcher::new(8);
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
            fail: true,
        });
        let handle = dispatcher.attach(observer.clone());

        dispatcher.publish("a", RunId::new(), snapshot());
        dispatcher.publish("b", RunId::new(), snapshot());
        drop(dispatcher);

        handle.await.unwrap();
        assert_eq!(observer.seen.lock().unwrap().len(), 2);
    }
}
