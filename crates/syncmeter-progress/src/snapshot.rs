//! Immutable progress snapshots
//!
//! A [`ProgressSnapshot`] is copied out of a
//! [`ProgressInfo`](crate::ProgressInfo) under a single lock and handed to
//! observers. It never references live engine state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use syncmeter_core::domain::{ItemPath, SyncFileItem};

use crate::rate::Estimates;

/// Progress of one in-flight file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProgress {
    /// The item being transferred
    pub item: SyncFileItem,
    /// Bytes transferred so far for this file
    pub completed_bytes: u64,
    /// Size of this file
    pub total_bytes: u64,
    /// Smoothed bandwidth and ETA for this file alone
    pub estimates: Estimates,
}

/// Point-in-time view of a synchronization run's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total_files: u64,
    pub completed_files: u64,
    pub current_file_index: u64,
    pub total_bytes: u64,
    pub completed_bytes: u64,
    /// Blended estimate for the whole run
    pub overall: Estimates,
    /// In-flight files keyed by path
    pub files: BTreeMap<ItemPath, FileProgress>,
    pub last_completed_item: Option<SyncFileItem>,
    pub taken_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    /// Blended estimate for the whole run
    pub fn overall_estimate(&self) -> Estimates {
        self.overall
    }

    /// Estimate for one in-flight file; zero if it is not in flight
    pub fn file_level_estimate(&self, path: &ItemPath) -> Estimates {
        self.files
            .get(path)
            .map(|f| f.estimates)
            .unwrap_or_default()
    }

    /// Completion in `[0.0, 1.0]`
    ///
    /// Uses bytes when the run has any, files otherwise. An empty run is
    /// complete.
    pub fn fraction_complete(&self) -> f64 {
        let (done, total) = if self.total_bytes > 0 {
            (self.completed_bytes, self.total_bytes)
        } else {
            (self.completed_files, self.total_files)
        };
        if total == 0 {
            return 1.0;
        }
        (done as f64 / total as f64).min(1.0)
    }

    /// Returns true once every expected file has completed
    pub fn is_finished(&self) -> bool {
        self.completed_files >= self.total_files && self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use syncmeter_core::domain::Instruction;

    use super::*;

    fn empty() -> ProgressSnapshot {
        ProgressSnapshot {
            total_files: 0,
            completed_files: 0,
            current_file_index: 0,
            total_bytes: 0,
            completed_bytes: 0,
            overall: Estimates::default(),
            files: BTreeMap::new(),
            last_completed_item: None,
            taken_at: Utc::now(),
        }
    }

    #[test]
    fn test_fraction_prefers_bytes() {
        let snap = ProgressSnapshot {
            total_files: 10,
            completed_files: 9,
            total_bytes: 1000,
            completed_bytes: 250,
            ..empty()
        };
        assert_eq!(snap.fraction_complete(), 0.25);
    }

    #[test]
    fn test_fraction_falls_back_to_files() {
        let snap = ProgressSnapshot {
            total_files: 4,
            completed_files: 1,
            ..empty()
        };
        assert_eq!(snap.fraction_complete(), 0.25);
    }

    #[test]
    fn test_empty_run_is_complete() {
        let snap = empty();
        assert_eq!(snap.fraction_complete(), 1.0);
        assert!(snap.is_finished());
    }

    #[test]
    fn test_file_level_estimate_lookup() {
        let path = ItemPath::new("big.iso").unwrap();
        let estimates = Estimates {
            bandwidth: 100.0,
            eta_millis: 5000.0,
        };
        let mut snap = empty();
        snap.files.insert(
            path.clone(),
            FileProgress {
                item: SyncFileItem::file(path.clone(), 1000, Instruction::New),
                completed_bytes: 500,
                total_bytes: 1000,
                estimates,
            },
        );

        assert_eq!(snap.file_level_estimate(&path), estimates);
        assert_eq!(
            snap.file_level_estimate(&ItemPath::new("other").unwrap()),
            Estimates::default()
        );
        assert!(!snap.is_finished());
    }

    #[test]
    fn test_serializes_to_json() {
        let snap = ProgressSnapshot {
            total_files: 1,
            ..empty()
        };
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["total_files"], 1);
        assert_eq!(value["overall"]["eta_millis"], 0.0);
    }
}
