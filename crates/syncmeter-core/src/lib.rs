//! Syncmeter Core - Domain types shared by the progress engine and its callers
//!
//! This crate contains:
//! - **Domain entities** - `SyncFileItem` and the instruction/direction/status
//!   enums a synchronization engine attaches to every item it touches
//! - **Newtypes** - `ItemPath` (validated path key) and `RunId`
//! - **Configuration** - YAML-backed `Config` with validation and a builder
//!
//! The domain module is pure data with no runtime dependencies. The
//! estimation engine itself lives in `syncmeter-progress`.

pub mod config;
pub mod domain;
