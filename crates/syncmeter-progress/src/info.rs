//! Progress aggregator for one synchronization run
//!
//! [`ProgressInfo`] folds per-file events from the synchronization engine
//! into two [`RateCounter`]s, one counting files and one counting bytes,
//! and blends their estimates into a single user-facing ETA.
//!
//! ## Event flow
//!
//! ```text
//!   discovery:  adjust_totals_for_file(item)          (once per item)
//!   transfer:   report_file_started(item)
//!               report_file_partial(item, bytes)*     (in-flight table)
//!               report_file_completed(item)
//!   timer:      tick()                                (1 Hz)
//! ```
//!
//! ## Blended ETA
//!
//! Remaining time is really `remaining_bytes / bandwidth + remaining_files *
//! per_file_overhead`, but only bandwidth and files/s are measured, and
//! independently. The byte model is preferred since it is accurate for big
//! transfers. When many small files go through (files/s near its maximum)
//! while the byte rate has collapsed (e.g. a run of deletes), the byte model
//! becomes far too pessimistic, so the estimate slides towards an optimistic
//! projection that assumes the best rates seen so far.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use syncmeter_core::domain::{ItemPath, SyncFileItem};
use tracing::trace;

use crate::rate::{Estimates, RateCounter};
use crate::snapshot::{FileProgress, ProgressSnapshot};

/// Files/s fraction of the observed maximum at or below which the
/// small-file signal is off.
const FPS_LOWER: f64 = 0.5;
/// Files/s fraction of the observed maximum at or above which the
/// small-file signal is fully on.
const FPS_UPPER: f64 = 0.8;
/// Bytes/s fraction of the observed maximum at or below which the
/// transfer counts as fully stalled.
const TRANSFER_LOWER: f64 = 0.01;
/// Bytes/s fraction of the observed maximum at or above which the
/// transfer is trusted again.
const TRANSFER_UPPER: f64 = 0.1;

/// An item currently being transferred
#[derive(Debug, Clone)]
struct InFlightFile {
    item: SyncFileItem,
    progress: RateCounter,
}

/// Aggregated progress of one synchronization run
///
/// Single writer: all mutating calls come from one stream of sync-engine
/// events. Observers on other tasks should read a [`ProgressSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    file_progress: RateCounter,
    size_progress: RateCounter,
    in_flight: HashMap<ItemPath, InFlightFile>,
    total_size_of_completed: u64,
    max_files_per_sec: f64,
    max_bytes_per_sec: f64,
    last_completed_item: Option<SyncFileItem>,
}

impl ProgressInfo {
    /// Creates an empty aggregator for a new run
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Event intake
    // ========================================================================

    /// Accounts for a discovered item before any transfer starts
    ///
    /// Files always count towards the file total; directories only when
    /// they are actually added, removed or moved. Bytes count only for
    /// items that move content.
    pub fn adjust_totals_for_file(&mut self, item: &SyncFileItem) {
        if item.counts_toward_files() {
            self.file_progress.add_to_total(1);
        }
        if item.counts_toward_size() {
            self.size_progress.add_to_total(item.size());
        }
    }

    /// Registers the start of a transfer
    pub fn report_file_started(&mut self, item: &SyncFileItem) {
        self.report_file_partial(item, 0);
    }

    /// Records `completed_bytes` transferred so far for `item`
    ///
    /// Also clears the last completed item, whatever its path.
    pub fn report_file_partial(&mut self, item: &SyncFileItem, completed_bytes: u64) {
        let entry = self
            .in_flight
            .entry(item.path().clone())
            .or_insert_with(|| InFlightFile {
                item: item.clone(),
                progress: RateCounter::new(),
            });
        entry.item = item.clone();
        entry.progress.set_total(item.size());
        entry.progress.set_completed(completed_bytes);
        self.recompute_completed_bytes();

        // A partial update for any item invalidates the "just finished" marker.
        self.last_completed_item = None;
    }

    /// Records that `item` finished
    ///
    /// Completion for a path that was never started is accepted: there is
    /// nothing to remove and the counters still advance.
    pub fn report_file_completed(&mut self, item: &SyncFileItem) {
        self.in_flight.remove(item.path());
        self.file_progress.set_completed(
            self.file_progress
                .completed()
                .saturating_add(item.affected_items()),
        );
        if item.counts_toward_size() {
            self.total_size_of_completed =
                self.total_size_of_completed.saturating_add(item.size());
        }
        self.recompute_completed_bytes();
        self.last_completed_item = Some(item.clone());
    }

    /// Rebuilds the completed byte count from finished and in-flight work
    fn recompute_completed_bytes(&mut self) {
        let in_flight: u64 = self
            .in_flight
            .values()
            .filter(|f| f.item.counts_toward_size())
            .map(|f| f.progress.completed())
            .fold(0u64, u64::saturating_add);
        self.size_progress
            .set_completed(self.total_size_of_completed.saturating_add(in_flight));
    }

    /// Recomputes all smoothed rates; call once per second while the run is active
    pub fn tick(&mut self) {
        self.size_progress.tick();
        self.file_progress.tick();

        for file in self.in_flight.values_mut() {
            file.progress.tick();
        }

        self.max_files_per_sec = self
            .max_files_per_sec
            .max(self.file_progress.rate_per_sec());
        self.max_bytes_per_sec = self
            .max_bytes_per_sec
            .max(self.size_progress.rate_per_sec());

        trace!(
            files_per_sec = self.file_progress.rate_per_sec(),
            bytes_per_sec = self.size_progress.rate_per_sec(),
            in_flight = self.in_flight.len(),
            "Progress estimates updated"
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of files expected in this run
    pub fn total_files(&self) -> u64 {
        self.file_progress.total()
    }

    /// Number of files finished
    pub fn completed_files(&self) -> u64 {
        self.file_progress.completed()
    }

    /// 1-based-ish position for "file N of M" displays
    pub fn current_file_index(&self) -> u64 {
        self.completed_files() + self.in_flight.len() as u64
    }

    /// Number of bytes expected in this run
    pub fn total_bytes(&self) -> u64 {
        self.size_progress.total()
    }

    /// Number of bytes transferred, including partial in-flight files
    pub fn completed_bytes(&self) -> u64 {
        self.size_progress.completed()
    }

    /// Number of items currently in flight
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Most recently completed item, if no partial update arrived since
    pub fn last_completed_item(&self) -> Option<&SyncFileItem> {
        self.last_completed_item.as_ref()
    }

    /// Highest smoothed files/s observed so far
    pub fn max_files_per_sec(&self) -> f64 {
        self.max_files_per_sec
    }

    /// Highest smoothed bytes/s observed so far
    pub fn max_bytes_per_sec(&self) -> f64 {
        self.max_bytes_per_sec
    }

    /// Estimates for a single in-flight file; zero if `path` is not in flight
    pub fn file_level_estimate(&self, path: &ItemPath) -> Estimates {
        self.in_flight
            .get(path)
            .map(|f| f.progress.estimates())
            .unwrap_or_default()
    }

    /// Blended estimate for the whole run
    ///
    /// Bandwidth always comes from the byte model; only the ETA is blended.
    pub fn overall_estimate(&self) -> Estimates {
        let file = self.file_progress.estimates();
        if self.size_progress.total() == 0 {
            return file;
        }

        let mut size = self.size_progress.estimates();

        // Best case: everything left finishes at the highest rates seen so far.
        // A max rate of 0 means no such work ever completed; it adds nothing.
        let optimistic_eta = remaining_millis(self.file_progress.remaining(), self.max_files_per_sec)
            + remaining_millis(self.size_progress.remaining(), self.max_bytes_per_sec);

        let near_max_fps = self.near_max_files_per_sec();
        let slow_transfer = self.slow_transfer();

        let be_optimistic = near_max_fps * slow_transfer;
        size.eta_millis = (1.0 - be_optimistic) * size.eta_millis + be_optimistic * optimistic_eta;
        size
    }

    /// 0 when files/s is at or below 50% of its max, 1 at or above 80%
    fn near_max_files_per_sec(&self) -> f64 {
        if self.max_files_per_sec <= 0.0 {
            return 0.0;
        }
        let fps = self.file_progress.rate_per_sec();
        ((fps - FPS_LOWER * self.max_files_per_sec)
            / ((FPS_UPPER - FPS_LOWER) * self.max_files_per_sec))
            .clamp(0.0, 1.0)
    }

    /// 1 when bytes/s is at or below 1% of its max, 0 at or above 10%
    fn slow_transfer(&self) -> f64 {
        if self.max_bytes_per_sec <= 0.0 {
            return 1.0;
        }
        let trans = self.size_progress.rate_per_sec();
        1.0 - ((trans - TRANSFER_LOWER * self.max_bytes_per_sec)
            / ((TRANSFER_UPPER - TRANSFER_LOWER) * self.max_bytes_per_sec))
            .clamp(0.0, 1.0)
    }

    /// Copies the current state into an immutable snapshot
    pub fn snapshot(&self) -> ProgressSnapshot {
        let files: BTreeMap<ItemPath, FileProgress> = self
            .in_flight
            .iter()
            .map(|(path, f)| {
                (
                    path.clone(),
                    FileProgress {
                        item: f.item.clone(),
                        completed_bytes: f.progress.completed(),
                        total_bytes: f.progress.total(),
                        estimates: f.progress.estimates(),
                    },
                )
            })
            .collect();

        ProgressSnapshot {
            total_files: self.total_files(),
            completed_files: self.completed_files(),
            current_file_index: self.current_file_index(),
            total_bytes: self.total_bytes(),
            completed_bytes: self.completed_bytes(),
            overall: self.overall_estimate(),
            files,
            last_completed_item: self.last_completed_item.clone(),
            taken_at: Utc::now(),
        }
    }
}

/// `remaining / rate` in milliseconds, 0 when the rate is 0
fn remaining_millis(remaining: u64, rate_per_sec: f64) -> f64 {
    if rate_per_sec > 0.0 {
        remaining as f64 / rate_per_sec * 1000.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use syncmeter_core::domain::{Direction, Instruction};

    use super::*;

    fn path(p: &str) -> ItemPath {
        ItemPath::new(p).unwrap()
    }

    fn download(p: &str, size: u64) -> SyncFileItem {
        SyncFileItem::file(path(p), size, Instruction::New).with_direction(Direction::Down)
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    mod totals_tests {
        use super::*;

        #[test]
        fn test_noop_directory_does_not_count() {
            let mut info = ProgressInfo::new();
            info.adjust_totals_for_file(&SyncFileItem::directory(path("docs"), Instruction::None));
            assert_eq!(info.total_files(), 0);
            assert_eq!(info.total_bytes(), 0);
        }

        #[test]
        fn test_new_directory_counts_as_file_only() {
            let mut info = ProgressInfo::new();
            info.adjust_totals_for_file(&SyncFileItem::directory(path("docs"), Instruction::New));
            assert_eq!(info.total_files(), 1);
            assert_eq!(info.total_bytes(), 0);
        }

        #[test]
        fn test_file_counts_files_and_bytes() {
            let mut info = ProgressInfo::new();
            info.adjust_totals_for_file(&download("a.bin", 1000));
            info.adjust_totals_for_file(&download("b.bin", 500));
            assert_eq!(info.total_files(), 2);
            assert_eq!(info.total_bytes(), 1500);
        }

        #[test]
        fn test_removed_file_does_not_count_bytes() {
            let mut info = ProgressInfo::new();
            info.adjust_totals_for_file(&SyncFileItem::file(path("old"), 5000, Instruction::Remove));
            assert_eq!(info.total_files(), 1);
            assert_eq!(info.total_bytes(), 0);
        }
    }

    mod transfer_tests {
        use super::*;

        #[test]
        fn test_partial_then_complete() {
            let mut info = ProgressInfo::new();
            let item = download("a.bin", 1000);
            info.adjust_totals_for_file(&item);

            info.report_file_started(&item);
            assert_eq!(info.in_flight_count(), 1);
            assert_eq!(info.current_file_index(), 1);

            info.report_file_partial(&item, 500);
            assert_eq!(info.completed_bytes(), 500);

            info.report_file_completed(&item);
            assert_eq!(info.completed_files(), 1);
            assert_eq!(info.completed_bytes(), 1000);
            assert_eq!(info.in_flight_count(), 0);
            assert_eq!(info.current_file_index(), 1);
        }

        #[test]
        fn test_partial_bytes_clamped_to_item_size() {
            let mut info = ProgressInfo::new();
            let item = download("a.bin", 100);
            info.adjust_totals_for_file(&item);
            info.report_file_partial(&item, 250);
            assert_eq!(info.completed_bytes(), 100);
        }

        #[test]
        fn test_in_flight_non_size_items_are_not_summed() {
            let mut info = ProgressInfo::new();
            let moved = SyncFileItem::file(path("m"), 800, Instruction::Rename);
            let item = download("a.bin", 1000);
            info.adjust_totals_for_file(&moved);
            info.adjust_totals_for_file(&item);

            info.report_file_partial(&moved, 800);
            info.report_file_partial(&item, 300);
            assert_eq!(info.completed_bytes(), 300);
        }

        #[test]
        fn test_completion_without_start_is_tolerated() {
            let mut info = ProgressInfo::new();
            let item = download("a.bin", 10);
            info.adjust_totals_for_file(&item);
            info.report_file_completed(&item);
            assert_eq!(info.completed_files(), 1);
            assert_eq!(info.completed_bytes(), 10);
        }

        #[test]
        fn test_affected_items_advance_file_count() {
            let mut info = ProgressInfo::new();
            for p in ["d", "d/a", "d/b", "d/c"] {
                info.adjust_totals_for_file(&SyncFileItem::file(path(p), 0, Instruction::Remove));
            }
            let rmdir =
                SyncFileItem::directory(path("d"), Instruction::Remove).with_affected_items(4);
            info.report_file_completed(&rmdir);
            assert_eq!(info.completed_files(), 4);
            assert_eq!(info.total_files(), 4);
        }

        #[test]
        fn test_completed_files_clamped_to_total() {
            let mut info = ProgressInfo::new();
            let item = download("a", 1);
            info.adjust_totals_for_file(&item);
            info.report_file_completed(&item.clone().with_affected_items(10));
            assert_eq!(info.completed_files(), 1);
        }

        #[test]
        fn test_recompute_is_idempotent() {
            let mut info = ProgressInfo::new();
            let a = download("a", 1000);
            let b = download("b", 1000);
            info.adjust_totals_for_file(&a);
            info.adjust_totals_for_file(&b);
            info.report_file_completed(&a);
            info.report_file_partial(&b, 250);

            info.recompute_completed_bytes();
            let first = info.completed_bytes();
            info.recompute_completed_bytes();
            assert_eq!(info.completed_bytes(), first);
            assert_eq!(first, 1250);
        }

        #[test]
        fn test_huge_affected_items_saturate() {
            let mut info = ProgressInfo::new();
            let a = download("a", 1);
            let b = download("b", 1);
            info.adjust_totals_for_file(&a);
            info.adjust_totals_for_file(&b);
            info.report_file_completed(&a);
            info.report_file_completed(&b.with_affected_items(u64::MAX));
            assert_eq!(info.completed_files(), 2);
        }

        #[test]
        fn test_huge_sizes_saturate() {
            let mut info = ProgressInfo::new();
            let half = u64::MAX / 2 + 1;
            let a = download("a", half);
            let b = download("b", half);
            let c = download("c", half);
            for item in [&a, &b, &c] {
                info.adjust_totals_for_file(item);
            }
            assert_eq!(info.total_bytes(), u64::MAX);

            info.report_file_completed(&a);
            info.report_file_completed(&b);
            assert_eq!(info.completed_bytes(), u64::MAX);

            // In-flight bytes on top of a saturated total stay clamped too
            info.report_file_partial(&c, half);
            assert_eq!(info.completed_bytes(), u64::MAX);
            assert_eq!(info.overall_estimate().eta_millis, 0.0);
        }

        #[test]
        fn test_in_flight_sum_saturates() {
            let mut info = ProgressInfo::new();
            let a = download("a", u64::MAX);
            let b = download("b", u64::MAX);
            info.adjust_totals_for_file(&a);
            info.adjust_totals_for_file(&b);
            info.report_file_partial(&a, u64::MAX);
            info.report_file_partial(&b, u64::MAX);
            assert_eq!(info.completed_bytes(), u64::MAX);
            assert_eq!(info.in_flight_count(), 2);
        }

        #[test]
        fn test_invariants_hold_at_numeric_extremes() {
            let sizes = [0u64, 1, u64::MAX / 3, u64::MAX / 2 + 1, u64::MAX - 1, u64::MAX];
            let affected = [1u64, 0, u64::MAX, 7, u64::MAX / 2, 1];
            let mut info = ProgressInfo::new();
            let items: Vec<SyncFileItem> = sizes
                .iter()
                .zip(affected)
                .enumerate()
                .map(|(i, (&size, n))| download(&format!("f{i}"), size).with_affected_items(n))
                .collect();

            for item in &items {
                info.adjust_totals_for_file(item);
            }
            for (i, item) in items.iter().enumerate() {
                info.report_file_started(item);
                info.report_file_partial(item, item.size() / 2);
                info.report_file_partial(item, u64::MAX);
                if i % 2 == 0 {
                    info.tick();
                }
                info.report_file_completed(item);

                assert!(info.completed_files() <= info.total_files());
                assert!(info.completed_bytes() <= info.total_bytes());
                let overall = info.overall_estimate();
                assert!(overall.bandwidth.is_finite());
                assert!(overall.eta_millis.is_finite() && overall.eta_millis >= 0.0);
            }
            info.tick();
            assert_eq!(info.completed_files(), info.total_files());
            assert_eq!(info.in_flight_count(), 0);
        }
    }

    mod last_completed_tests {
        use super::*;

        #[test]
        fn test_completion_sets_last_completed() {
            let mut info = ProgressInfo::new();
            let item = download("a", 10);
            info.report_file_completed(&item);
            assert_eq!(info.last_completed_item(), Some(&item));
        }

        #[test]
        fn test_partial_on_other_path_clears_last_completed() {
            let mut info = ProgressInfo::new();
            let a = download("a", 10);
            let b = download("b", 10);
            info.adjust_totals_for_file(&a);
            info.adjust_totals_for_file(&b);
            info.report_file_completed(&a);
            info.report_file_partial(&b, 1);
            assert!(info.last_completed_item().is_none());
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_updates_all_counters_and_maxima() {
            let mut info = ProgressInfo::new();
            let a = download("a", 1000);
            let b = download("b", 1000);
            info.adjust_totals_for_file(&a);
            info.adjust_totals_for_file(&b);

            info.report_file_completed(&a);
            info.report_file_partial(&b, 200);
            info.tick();

            assert!(approx_eq(info.file_progress.rate_per_sec(), 1.0));
            assert!(approx_eq(info.size_progress.rate_per_sec(), 1200.0));
            assert!(approx_eq(info.file_level_estimate(b.path()).bandwidth, 200.0));
            assert!(approx_eq(info.max_files_per_sec(), 1.0));
            assert!(approx_eq(info.max_bytes_per_sec(), 1200.0));

            info.tick();
            assert!(info.max_bytes_per_sec() >= info.size_progress.rate_per_sec());
            assert!(approx_eq(info.max_bytes_per_sec(), 1200.0));
        }

        #[test]
        fn test_file_level_estimate_for_unknown_path() {
            let info = ProgressInfo::new();
            assert_eq!(info.file_level_estimate(&path("nope")), Estimates::default());
        }
    }

    mod blend_tests {
        use super::*;

        #[test]
        fn test_no_bytes_returns_file_model() {
            let mut info = ProgressInfo::new();
            for p in ["a", "b", "c", "d"] {
                info.adjust_totals_for_file(&SyncFileItem::file(path(p), 10, Instruction::Remove));
            }
            info.report_file_completed(&SyncFileItem::file(path("a"), 10, Instruction::Remove));
            info.tick();

            assert_eq!(info.total_bytes(), 0);
            assert_eq!(info.overall_estimate(), info.file_progress.estimates());
            assert!(approx_eq(info.overall_estimate().eta_millis, 3000.0));
        }

        #[test]
        fn test_full_optimism_uses_optimistic_eta() {
            let mut info = ProgressInfo::new();
            info.file_progress.set_total(100);
            info.file_progress.set_completed(40);
            info.size_progress.set_total(1_000_000);
            info.size_progress.set_completed(400_000);

            info.max_files_per_sec = 10.0;
            info.file_progress.set_rate_for_test(9.0);
            info.max_bytes_per_sec = 1000.0;
            info.size_progress.set_rate_for_test(5.0);

            assert!(approx_eq(info.near_max_files_per_sec(), 1.0));
            assert!(approx_eq(info.slow_transfer(), 1.0));

            let optimistic = 60.0 / 10.0 * 1000.0 + 600_000.0 / 1000.0 * 1000.0;
            let est = info.overall_estimate();
            assert!(approx_eq(est.eta_millis, optimistic));
            assert!(approx_eq(est.bandwidth, 5.0));

            let byte_model = info.size_progress.estimates().eta_millis;
            assert!(!approx_eq(est.eta_millis, byte_model));
        }

        #[test]
        fn test_no_optimism_uses_byte_model() {
            let mut info = ProgressInfo::new();
            info.file_progress.set_total(100);
            info.size_progress.set_total(1_000_000);
            info.max_files_per_sec = 10.0;
            info.file_progress.set_rate_for_test(4.0);
            info.max_bytes_per_sec = 1000.0;
            info.size_progress.set_rate_for_test(500.0);

            assert_eq!(info.near_max_files_per_sec(), 0.0);
            assert_eq!(info.slow_transfer(), 0.0);
            assert_eq!(
                info.overall_estimate(),
                info.size_progress.estimates()
            );
        }

        #[test]
        fn test_partial_weights_interpolate() {
            let mut info = ProgressInfo::new();
            info.file_progress.set_total(10);
            info.size_progress.set_total(10_000);
            info.max_files_per_sec = 10.0;
            // 65% of max: halfway between 50% and 80%
            info.file_progress.set_rate_for_test(6.5);
            info.max_bytes_per_sec = 1000.0;
            // 5.5% of max: halfway between 1% and 10%
            info.size_progress.set_rate_for_test(55.0);

            assert!(approx_eq(info.near_max_files_per_sec(), 0.5));
            assert!(approx_eq(info.slow_transfer(), 0.5));

            let byte_eta = 10_000.0 / 55.0 * 1000.0;
            let optimistic = 10.0 / 10.0 * 1000.0 + 10_000.0 / 1000.0 * 1000.0;
            let expected = 0.75 * byte_eta + 0.25 * optimistic;
            assert!(approx_eq(info.overall_estimate().eta_millis, expected));
        }

        #[test]
        fn test_zero_maxima_never_divide() {
            let mut info = ProgressInfo::new();
            info.adjust_totals_for_file(&download("a", 100));
            let est = info.overall_estimate();
            assert!(est.eta_millis.is_finite());
            assert_eq!(est, Estimates::default());
        }

        #[test]
        fn test_zero_file_max_drops_that_term() {
            let mut info = ProgressInfo::new();
            info.file_progress.set_total(5);
            info.size_progress.set_total(2000);
            info.max_bytes_per_sec = 1000.0;
            assert!(approx_eq(
                remaining_millis(info.file_progress.remaining(), info.max_files_per_sec),
                0.0
            ));
            assert!(approx_eq(
                remaining_millis(info.size_progress.remaining(), info.max_bytes_per_sec),
                2000.0
            ));
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_snapshot_copies_counters_and_in_flight() {
            let mut info = ProgressInfo::new();
            let a = download("a", 1000);
            let b = download("b", 400);
            info.adjust_totals_for_file(&a);
            info.adjust_totals_for_file(&b);
            info.report_file_completed(&a);
            info.report_file_partial(&b, 100);
            info.tick();

            let snap = info.snapshot();
            assert_eq!(snap.total_files, 2);
            assert_eq!(snap.completed_files, 1);
            assert_eq!(snap.current_file_index, 2);
            assert_eq!(snap.total_bytes, 1400);
            assert_eq!(snap.completed_bytes, 1100);
            assert_eq!(snap.overall, info.overall_estimate());
            assert_eq!(snap.files.len(), 1);
            assert_eq!(snap.files[b.path()].completed_bytes, 100);
            assert_eq!(snap.files[b.path()].total_bytes, 400);
            assert_eq!(snap.file_level_estimate(b.path()), info.file_level_estimate(b.path()));
            assert!(snap.last_completed_item.is_none());
        }
    }
}
