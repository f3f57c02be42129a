//! Syncmeter Progress - throughput and ETA estimation for sync runs
//!
//! This crate turns the per-file event stream of a synchronization engine
//! into user-facing progress: files and bytes done, smoothed bandwidth and
//! a blended time-remaining estimate.
//!
//! ## Modules
//!
//! - [`rate`] - smoothed rate counter (`RateCounter`, `Estimates`)
//! - [`info`] - per-run aggregator (`ProgressInfo`)
//! - [`snapshot`] - immutable copies handed to observers
//! - [`describe`] - human-readable item descriptions
//! - [`dispatcher`] - broadcast hub and observer port
//! - [`run`] - run lifecycle with the 1 Hz ticker
//!
//! ## Example
//!
//! ```no_run
//! use syncmeter_core::{config::ProgressConfig, domain::{Instruction, ItemPath, SyncFileItem}};
//! use syncmeter_progress::{ProgressDispatcher, ProgressRun};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let dispatcher = ProgressDispatcher::default();
//! let mut events = dispatcher.subscribe();
//!
//! let mut run = ProgressRun::new("Documents", dispatcher.clone(), &ProgressConfig::default());
//! run.start();
//!
//! let item = SyncFileItem::file(ItemPath::new("report.pdf")?, 4096, Instruction::New);
//! run.adjust_totals_for_file(&item);
//! run.report_file_started(&item);
//! run.report_file_completed(&item);
//!
//! let event = events.recv().await?;
//! println!("{} of {} files", event.snapshot.completed_files, event.snapshot.total_files);
//!
//! run.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod describe;
pub mod dispatcher;
pub mod info;
pub mod rate;
pub mod run;
pub mod snapshot;

pub use describe::{action_description, result_description};
pub use dispatcher::{IProgressObserver, ProgressDispatcher, ProgressEvent};
pub use info::ProgressInfo;
pub use rate::{Estimates, RateCounter};
pub use run::{ProgressRun, TICK_INTERVAL};
pub use snapshot::{FileProgress, ProgressSnapshot};
