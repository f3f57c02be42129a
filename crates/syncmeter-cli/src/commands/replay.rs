//! Replay command - Drive the progress engine from a recorded script
//!
//! Provides the `syncmeter replay` CLI command which:
//! 1. Reads a YAML script of sync-engine events
//! 2. Checks that every event refers to a discovered item
//! 3. Feeds the events into a `ProgressRun`, with one virtual second per tick
//! 4. Prints a progress line per tick and a final summary
//!
//! ## Script format
//!
//! ```yaml
//! folder: Documents
//! events:
//!   - discover: { path: video.mp4, size: 4096, instruction: new, direction: down }
//!   - start: video.mp4
//!   - partial: { path: video.mp4, bytes: 1024 }
//!   - tick
//!   - tick: { count: 2 }
//!   - complete: video.mp4
//!   - complete: { path: video.mp4, status: soft_error }
//! ```

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use syncmeter_core::{
    config::ProgressConfig,
    domain::{ItemPath, ItemStatus, SyncFileItem},
};
use syncmeter_progress::{
    result_description, IProgressObserver, ProgressDispatcher, ProgressEvent, ProgressRun,
    ProgressSnapshot,
};
use tracing::{debug, info};

use crate::output::{format_bytes, format_eta, format_rate, get_formatter, OutputFormat};

/// Replay command with clap options
#[derive(Debug, Args)]
pub struct ReplayCommand {
    /// Path to the replay script (YAML)
    pub script: PathBuf,
}

impl ReplayCommand {
    /// Execute the replay command
    pub async fn execute(&self, config: &ProgressConfig, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        let content = std::fs::read_to_string(&self.script).with_context(|| {
            format!("Failed to read replay script: {}", self.script.display())
        })?;
        let script = ReplayScript::parse(&content).with_context(|| {
            format!("Failed to parse replay script: {}", self.script.display())
        })?;

        let problems = script.check();
        if !problems.is_empty() {
            for problem in &problems {
                formatter.error(problem);
            }
            anyhow::bail!(
                "Replay script has {} invalid event{}",
                problems.len(),
                if problems.len() == 1 { "" } else { "s" }
            );
        }

        info!(
            script = %self.script.display(),
            folder = %script.folder,
            events = script.events.len(),
            "Replaying script"
        );

        let report = replay(&script, config).await?;

        if matches!(format, OutputFormat::Json) {
            let ticks: Vec<&ProgressSnapshot> = report
                .steps
                .iter()
                .filter_map(|step| match step {
                    ReplayStep::Tick { snapshot, .. } => Some(snapshot.as_ref()),
                    ReplayStep::Completed(_) => None,
                })
                .collect();
            let json = serde_json::json!({
                "folder": script.folder,
                "events": script.events.len(),
                "elapsed_secs": report.elapsed_secs,
                "ticks": ticks,
                "summary": report.summary.as_ref(),
            });
            formatter.print_json(&json);
            return Ok(());
        }

        for step in &report.steps {
            match step {
                ReplayStep::Tick { second, snapshot } => {
                    formatter.info(&tick_line(*second, snapshot));
                }
                ReplayStep::Completed(item) => {
                    let line = format!("{}: {}", item.path(), result_description(item));
                    if item.status().is_warning_kind() {
                        formatter.warn(&format!("{} ({})", line, item.status()));
                    } else {
                        formatter.info(&line);
                    }
                }
            }
        }

        let summary = &report.summary;
        formatter.success(&format!(
            "Replayed {} events for '{}' over {}s",
            script.events.len(),
            script.folder,
            report.elapsed_secs
        ));
        formatter.info(&format!(
            "Files: {}/{}",
            summary.completed_files, summary.total_files
        ));
        formatter.info(&format!(
            "Bytes: {}/{}",
            format_bytes(summary.completed_bytes),
            format_bytes(summary.total_bytes)
        ));
        if let Some(last) = &summary.last_completed_item {
            formatter.info(&format!("Last completed: {}", last.path()));
        }

        Ok(())
    }
}

// ============================================================================
// Script model
// ============================================================================

/// A recorded sequence of sync-engine events for one folder
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayScript {
    pub folder: String,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

/// One step of a replay script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawEvent")]
pub enum ReplayEvent {
    /// Discovery reported an item
    Discover(SyncFileItem),
    /// A transfer started
    Start(ItemPath),
    /// A transfer made progress
    Partial { path: ItemPath, bytes: u64 },
    /// An item finished, optionally with an outcome other than its discovered one
    Complete {
        path: ItemPath,
        status: Option<ItemStatus>,
    },
    /// `count` seconds elapsed
    Tick { count: u32 },
}

/// On-disk shapes: either the bare keyword `tick` or a single-key map
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEvent {
    Keyword(Keyword),
    Tagged(TaggedEvent),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Keyword {
    Tick,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedEvent {
    Discover(SyncFileItem),
    Start(ItemPath),
    Partial {
        path: ItemPath,
        bytes: u64,
    },
    Complete(CompleteTarget),
    Tick {
        #[serde(default = "one")]
        count: u32,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompleteTarget {
    Path(ItemPath),
    Detailed {
        path: ItemPath,
        #[serde(default)]
        status: Option<ItemStatus>,
    },
}

fn one() -> u32 {
    1
}

impl From<RawEvent> for ReplayEvent {
    fn from(raw: RawEvent) -> Self {
        match raw {
            RawEvent::Keyword(Keyword::Tick) => ReplayEvent::Tick { count: 1 },
            RawEvent::Tagged(TaggedEvent::Discover(item)) => ReplayEvent::Discover(item),
            RawEvent::Tagged(TaggedEvent::Start(path)) => ReplayEvent::Start(path),
            RawEvent::Tagged(TaggedEvent::Partial { path, bytes }) => {
                ReplayEvent::Partial { path, bytes }
            }
            RawEvent::Tagged(TaggedEvent::Complete(CompleteTarget::Path(path))) => {
                ReplayEvent::Complete { path, status: None }
            }
            RawEvent::Tagged(TaggedEvent::Complete(CompleteTarget::Detailed { path, status })) => {
                ReplayEvent::Complete { path, status }
            }
            RawEvent::Tagged(TaggedEvent::Tick { count }) => ReplayEvent::Tick { count },
        }
    }
}

impl ReplayEvent {
    /// Path the event refers to, if it refers to an already discovered item
    fn referenced_path(&self) -> Option<&ItemPath> {
        match self {
            ReplayEvent::Start(path)
            | ReplayEvent::Partial { path, .. }
            | ReplayEvent::Complete { path, .. } => Some(path),
            ReplayEvent::Discover(_) | ReplayEvent::Tick { .. } => None,
        }
    }
}

impl ReplayScript {
    /// Parses a script from YAML
    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Lists every event that refers to a path not discovered before it
    ///
    /// Returns an empty list for a well-formed script.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.folder.trim().is_empty() {
            problems.push("folder must not be empty".to_string());
        }

        let mut discovered = std::collections::HashSet::new();
        for (index, event) in self.events.iter().enumerate() {
            if let ReplayEvent::Discover(item) = event {
                discovered.insert(item.path().clone());
            } else if let Some(path) = event.referenced_path() {
                if !discovered.contains(path) {
                    problems.push(format!(
                        "event {}: unknown path '{}' (not discovered before use)",
                        index + 1,
                        path
                    ));
                }
            }
        }
        problems
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Something worth printing that happened during a replay
#[derive(Debug, Clone)]
pub enum ReplayStep {
    /// State after the tick ending at virtual second `second`
    Tick {
        second: u64,
        snapshot: Arc<ProgressSnapshot>,
    },
    /// An item finished
    Completed(SyncFileItem),
}

/// Outcome of a replay
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    /// Virtual seconds elapsed (number of ticks)
    pub elapsed_secs: u64,
    /// Final snapshot published when the run stopped
    pub summary: Arc<ProgressSnapshot>,
}

/// Logs every published progress event
struct TracingObserver;

#[async_trait::async_trait]
impl IProgressObserver for TracingObserver {
    async fn on_progress(&self, event: &ProgressEvent) -> anyhow::Result<()> {
        let snapshot = &event.snapshot;
        debug!(
            folder = %event.folder,
            run_id = %event.run_id,
            completed_files = snapshot.completed_files,
            total_files = snapshot.total_files,
            completed_bytes = snapshot.completed_bytes,
            total_bytes = snapshot.total_bytes,
            "Progress"
        );
        Ok(())
    }
}

/// Feeds a checked script into a fresh `ProgressRun`
///
/// Time is virtual: the run's ticker is never started and each `tick`
/// event calls [`ProgressRun::tick`] directly, so a replay is
/// deterministic.
pub async fn replay(script: &ReplayScript, config: &ProgressConfig) -> Result<ReplayReport> {
    let dispatcher = ProgressDispatcher::new(config.broadcast_capacity);
    let observer = dispatcher.attach(Arc::new(TracingObserver));

    let mut run = ProgressRun::new(script.folder.clone(), dispatcher.clone(), config);
    let mut items: HashMap<ItemPath, SyncFileItem> = HashMap::new();
    let mut steps = Vec::new();
    let mut elapsed_secs = 0;

    for (index, event) in script.events.iter().enumerate() {
        match event {
            ReplayEvent::Discover(item) => {
                items.insert(item.path().clone(), item.clone());
                run.adjust_totals_for_file(item);
            }
            ReplayEvent::Start(path) => {
                run.report_file_started(lookup(&items, path, index)?);
            }
            ReplayEvent::Partial { path, bytes } => {
                run.report_file_partial(lookup(&items, path, index)?, *bytes);
            }
            ReplayEvent::Complete { path, status } => {
                let mut item = lookup(&items, path, index)?.clone();
                if let Some(status) = status {
                    item.set_status(*status);
                }
                run.report_file_completed(&item);
                steps.push(ReplayStep::Completed(item));
            }
            ReplayEvent::Tick { count } => {
                for _ in 0..*count {
                    elapsed_secs += 1;
                    let snapshot = run.tick();
                    steps.push(ReplayStep::Tick {
                        second: elapsed_secs,
                        snapshot,
                    });
                }
            }
        }
    }

    let summary = run.stop().await;
    drop(run);
    drop(dispatcher);
    observer.await.context("Progress observer task failed")?;

    Ok(ReplayReport {
        steps,
        elapsed_secs,
        summary,
    })
}

fn lookup<'a>(
    items: &'a HashMap<ItemPath, SyncFileItem>,
    path: &ItemPath,
    index: usize,
) -> Result<&'a SyncFileItem> {
    items.get(path).with_context(|| {
        format!(
            "event {}: unknown path '{}' (not discovered before use)",
            index + 1,
            path
        )
    })
}

/// Renders one progress line, e.g.
/// `[  3s] 2/5 files  1.5 KiB/4.0 KiB  512 B/s  ETA 0:06`
fn tick_line(second: u64, snapshot: &ProgressSnapshot) -> String {
    let overall = snapshot.overall_estimate();
    format!(
        "[{:>3}s] {}/{} files  {}/{}  {}  ETA {}",
        second,
        snapshot.completed_files,
        snapshot.total_files,
        format_bytes(snapshot.completed_bytes),
        format_bytes(snapshot.total_bytes),
        format_rate(overall.bandwidth),
        format_eta(overall.eta())
    )
}
